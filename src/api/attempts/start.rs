use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::db::models::QuestionOption;
use crate::db::types::AttemptStatus;
use crate::repositories;
use crate::schemas::attempt::StartAttemptResponse;
use crate::services::question_order;

use super::helpers;

pub(crate) async fn start_attempt(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<StartAttemptResponse>), ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;

    if !exam.is_published {
        return Err(ApiError::InvalidState("Exam is not published".to_string()));
    }

    // Fast path: an in-progress attempt resumes instead of duplicating.
    if let Some(existing) =
        repositories::attempts::find_in_progress(state.db(), &user.id, &exam_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
    {
        let question_count = repositories::attempts::count_questions(state.db(), &existing.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count attempt questions"))?;
        return Ok((
            StatusCode::OK,
            Json(StartAttemptResponse {
                attempt_id: existing.id,
                time_limit_seconds: exam.time_limit_seconds,
                question_count,
                resumed: true,
            }),
        ));
    }

    // Snapshot source: the catalog's ordered question list with options.
    let question_rows = repositories::catalog::ordered_questions(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam questions"))?;

    let question_ids: Vec<String> =
        question_rows.iter().map(|row| row.question_id.clone()).collect();
    let options = repositories::catalog::options_for_questions(state.db(), &question_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question options"))?;

    let mut options_by_question: HashMap<String, Vec<QuestionOption>> = HashMap::new();
    for option in options {
        options_by_question.entry(option.question_id.clone()).or_default().push(option);
    }
    let text_by_question: HashMap<String, String> = question_rows
        .into_iter()
        .map(|row| (row.question_id, row.text))
        .collect();

    let seed = question_order::random_seed();
    let ordered_ids =
        question_order::attempt_question_order(question_ids, exam.randomize_questions, seed);

    let snapshot: Vec<repositories::attempts::SnapshotQuestion> = ordered_ids
        .into_iter()
        .enumerate()
        .map(|(index, question_id)| {
            let answers = options_by_question
                .remove(&question_id)
                .unwrap_or_default()
                .into_iter()
                .map(|option| repositories::attempts::SnapshotAnswer {
                    id: Uuid::new_v4().to_string(),
                    option_id: option.id,
                    option_text: option.text,
                    is_correct: option.is_correct,
                    position: option.position,
                })
                .collect();

            repositories::attempts::SnapshotQuestion {
                id: Uuid::new_v4().to_string(),
                question_text: text_by_question.get(&question_id).cloned().unwrap_or_default(),
                question_id,
                position: (index + 1) as i32,
                answers,
            }
        })
        .collect();

    let now = helpers::now_primitive();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    repositories::attempts::acquire_start_lock(&mut *tx, &exam_id, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to acquire start lock"))?;

    // Re-check under the lock: a concurrent start may have won.
    if let Some(existing) =
        repositories::attempts::find_in_progress(&mut *tx, &user.id, &exam_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
    {
        let question_count = repositories::attempts::count_questions(&mut *tx, &existing.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count attempt questions"))?;
        tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;
        return Ok((
            StatusCode::OK,
            Json(StartAttemptResponse {
                attempt_id: existing.id,
                time_limit_seconds: exam.time_limit_seconds,
                question_count,
                resumed: true,
            }),
        ));
    }

    let attempt_id = Uuid::new_v4().to_string();
    let inserted = repositories::attempts::create(
        &mut *tx,
        repositories::attempts::CreateAttempt {
            id: &attempt_id,
            user_id: &user.id,
            exam_id: &exam_id,
            status: AttemptStatus::InProgress,
            started_at: now,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create attempt"))?;

    if !inserted {
        let existing = repositories::attempts::find_in_progress(&mut *tx, &user.id, &exam_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
            .ok_or_else(|| {
                ApiError::InvalidState("An attempt for this exam is already in progress".to_string())
            })?;
        let question_count = repositories::attempts::count_questions(&mut *tx, &existing.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count attempt questions"))?;
        tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;
        return Ok((
            StatusCode::OK,
            Json(StartAttemptResponse {
                attempt_id: existing.id,
                time_limit_seconds: exam.time_limit_seconds,
                question_count,
                resumed: true,
            }),
        ));
    }

    let question_count = snapshot.len() as i64;
    repositories::attempts::insert_snapshot(&mut tx, &attempt_id, &snapshot)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to materialize attempt snapshot"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(
        exam_id = %exam_id,
        attempt_id = %attempt_id,
        user_id = %user.id,
        question_count,
        randomized = exam.randomize_questions,
        "Attempt started"
    );

    Ok((
        StatusCode::CREATED,
        Json(StartAttemptResponse {
            attempt_id,
            time_limit_seconds: exam.time_limit_seconds,
            question_count,
            resumed: false,
        }),
    ))
}

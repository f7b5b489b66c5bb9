use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_owner_or_admin, CurrentUser};
use crate::core::state::AppState;
use crate::db::types::AttemptStatus;
use crate::repositories;
use crate::schemas::attempt::{SubmitAttemptRequest, SubmitAttemptResponse};
use crate::services::scoring;

use super::helpers;

/// The terminal transition: scores the frozen snapshot against the
/// stored selections and completes the attempt. Exactly one of two
/// concurrent submits succeeds; the loser gets the invalid-state error.
pub(crate) async fn submit_attempt(
    Path(attempt_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    payload: Option<Json<SubmitAttemptRequest>>,
) -> Result<Json<SubmitAttemptResponse>, ApiError> {
    let Json(payload) = payload.unwrap_or_default();
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let attempt = repositories::attempts::lock_by_id(&mut *tx, &attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .ok_or_else(|| ApiError::NotFound("Attempt not found".to_string()))?;

    require_owner_or_admin(&user, &attempt.user_id)?;

    if attempt.status != AttemptStatus::InProgress {
        return Err(ApiError::InvalidState("Attempt is already completed".to_string()));
    }

    let exam = repositories::catalog::find_exam(&mut *tx, &attempt.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::Internal("Exam missing for attempt".to_string()))?;

    // Scoring input comes from the snapshot rows alone; the live
    // catalog plays no part.
    let question_refs = repositories::attempts::question_refs(&mut *tx, &attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt questions"))?;
    let answer_state = repositories::attempts::answer_state(&mut *tx, &attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch answer state"))?;

    let mut correct_by_question: HashMap<String, HashSet<String>> = HashMap::new();
    let mut selected_by_question: HashMap<String, HashSet<String>> = HashMap::new();
    for row in answer_state {
        if row.is_correct {
            correct_by_question
                .entry(row.attempt_question_id.clone())
                .or_default()
                .insert(row.option_id.clone());
        }
        if row.is_selected {
            selected_by_question
                .entry(row.attempt_question_id)
                .or_default()
                .insert(row.option_id);
        }
    }

    let empty = HashSet::new();
    let outcomes: Vec<bool> = question_refs
        .iter()
        .map(|question| {
            let correct = correct_by_question.get(&question.id).unwrap_or(&empty);
            let selected = selected_by_question.get(&question.id).unwrap_or(&empty);
            scoring::question_is_correct(correct, selected)
        })
        .collect();

    let summary = scoring::score_attempt(&outcomes);
    let passed = scoring::is_passing(summary.score, exam.passing_score);

    let now = helpers::now_primitive();
    let completed = repositories::attempts::complete(
        &mut *tx,
        &attempt_id,
        summary.score,
        now,
        payload.time_spent_seconds,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to complete attempt"))?;

    if !completed {
        return Err(ApiError::InvalidState("Attempt is already completed".to_string()));
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(
        attempt_id = %attempt_id,
        exam_id = %attempt.exam_id,
        user_id = %attempt.user_id,
        score = summary.score,
        correct_count = summary.correct_count,
        total_questions = summary.total_questions,
        passed,
        "Attempt submitted and scored"
    );

    Ok(Json(SubmitAttemptResponse {
        attempt_id,
        score: summary.score,
        total_questions: summary.total_questions,
        correct_count: summary.correct_count,
        passed,
    }))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::api::errors::ApiError;
use crate::api::guards::{require_owner_or_admin, CurrentAdmin, CurrentUser};
use crate::api::pagination::PaginatedResponse;
use crate::core::state::AppState;
use crate::db::types::AttemptStatus;
use crate::repositories;
use crate::schemas::attempt::{
    format_primitive, AttemptDetailResponse, AttemptSummaryResponse, FlagQuestionRequest,
    ListAttemptsQuery,
};

use super::helpers;

/// Full attempt detail in attempt-local question order, for taking the
/// exam (in progress) and for review screens (completed).
pub(crate) async fn get_attempt(
    Path(attempt_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AttemptDetailResponse>, ApiError> {
    let attempt = helpers::fetch_attempt(state.db(), &attempt_id).await?;
    require_owner_or_admin(&user, &attempt.user_id)?;

    let exam = repositories::catalog::find_exam(state.db(), &attempt.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::Internal("Exam missing for attempt".to_string()))?;

    let questions = repositories::attempts::list_questions(state.db(), &attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt questions"))?;
    let answers = repositories::attempts::list_answers(state.db(), &attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt answers"))?;

    Ok(Json(helpers::attempt_to_detail(attempt, &exam, questions, answers)))
}

/// Bookmarks a snapshot question. No scoring effect; allowed only while
/// the attempt is in progress.
pub(crate) async fn flag_question(
    Path((attempt_id, question_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<FlagQuestionRequest>,
) -> Result<StatusCode, ApiError> {
    let attempt = helpers::fetch_attempt(state.db(), &attempt_id).await?;
    require_owner_or_admin(&user, &attempt.user_id)?;

    if attempt.status != AttemptStatus::InProgress {
        return Err(ApiError::InvalidState("Attempt is already completed".to_string()));
    }

    let updated = repositories::attempts::set_question_flag(
        state.db(),
        &attempt_id,
        &question_id,
        payload.is_flagged,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update flag"))?;

    if !updated {
        return Err(ApiError::NotFound("Question is not part of this attempt".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Administrative listing of an exam's attempts, newest first.
pub(crate) async fn list_exam_attempts(
    Path(exam_id): Path<String>,
    Query(params): Query<ListAttemptsQuery>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<PaginatedResponse<AttemptSummaryResponse>>, ApiError> {
    helpers::fetch_exam(state.db(), &exam_id).await?;

    let (skip, limit) = crate::api::pagination::page_window(
        params.skip,
        params.limit,
        state.settings().pagination().max_page_size,
    );

    let rows =
        repositories::attempts::list_by_exam(state.db(), &exam_id, params.status, skip, limit)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list attempts"))?;
    let total_count = repositories::attempts::count_by_exam(state.db(), &exam_id, params.status)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count attempts"))?;

    let items = rows
        .into_iter()
        .map(|row| AttemptSummaryResponse {
            id: row.id,
            user_id: row.user_id,
            user_email: row.user_email,
            user_full_name: row.user_full_name,
            exam_id: row.exam_id,
            status: row.status,
            score: row.score,
            started_at: format_primitive(row.started_at),
            completed_at: row.completed_at.map(format_primitive),
            time_spent_seconds: row.time_spent_seconds,
        })
        .collect();

    Ok(Json(PaginatedResponse { items, total_count, skip, limit }))
}

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::errors::ApiError;
use crate::api::guards::{require_owner_or_admin, CurrentUser};
use crate::core::state::AppState;
use crate::db::types::AttemptStatus;
use crate::repositories;
use crate::schemas::attempt::RecordAnswersRequest;

/// Records a partial or full answer batch. Idempotent: replaying the
/// same payload leaves the stored selection state unchanged. The whole
/// batch applies inside one transaction or not at all.
pub(crate) async fn record_answers(
    Path(attempt_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<RecordAnswersRequest>,
) -> Result<StatusCode, ApiError> {
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    // The row lock serializes this batch against a concurrent submit:
    // no answer can change after the attempt has been scored.
    let attempt = repositories::attempts::lock_by_id(&mut *tx, &attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .ok_or_else(|| ApiError::NotFound("Attempt not found".to_string()))?;

    require_owner_or_admin(&user, &attempt.user_id)?;

    if attempt.status != AttemptStatus::InProgress {
        return Err(ApiError::InvalidState("Attempt is already completed".to_string()));
    }

    let question_refs = repositories::attempts::question_refs(&mut *tx, &attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt questions"))?;
    let by_question_id: HashMap<String, String> = question_refs
        .into_iter()
        .map(|entry| (entry.question_id, entry.id))
        .collect();

    for (question_id, selection) in payload.answers {
        // Answers for questions outside this attempt are skipped, not
        // rejected; clients may hold stale local state.
        let Some(attempt_question_id) = by_question_id.get(&question_id) else {
            tracing::debug!(
                attempt_id = %attempt_id,
                question_id = %question_id,
                "Ignoring answer for a question outside the attempt"
            );
            continue;
        };

        let selected_option_ids = selection.into_option_ids();
        repositories::attempts::update_selections(
            &mut *tx,
            attempt_question_id,
            &selected_option_ids,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update answers"))?;
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    Ok(StatusCode::NO_CONTENT)
}

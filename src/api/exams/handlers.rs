use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::pagination::PaginatedResponse;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::exam::{
    format_primitive, ExamDetailResponse, ExamSummaryResponse, ListExamsQuery,
};

pub(in crate::api::exams) async fn list_exams(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<ListExamsQuery>,
) -> Result<Json<PaginatedResponse<ExamSummaryResponse>>, ApiError> {
    let (skip, limit) = crate::api::pagination::page_window(
        params.skip,
        params.limit,
        state.settings().pagination().max_page_size,
    );
    let title = params.title.as_deref();

    let rows = repositories::catalog::list_exams(state.db(), params.is_published, title, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;
    let total_count = repositories::catalog::count_exams(state.db(), params.is_published, title)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count exams"))?;

    let items = rows
        .into_iter()
        .map(|row| ExamSummaryResponse {
            id: row.id,
            title: row.title,
            description: row.description,
            time_limit_seconds: row.time_limit_seconds,
            passing_score: row.passing_score,
            randomize_questions: row.randomize_questions,
            is_published: row.is_published,
            created_at: format_primitive(row.created_at),
            question_count: row.question_count,
            attempt_count: row.attempt_count,
        })
        .collect();

    Ok(Json(PaginatedResponse { items, total_count, skip, limit }))
}

/// Exam metadata for the catalog browser. Option correctness never
/// leaves the catalog through this surface; question content is served
/// from the attempt snapshot once an attempt exists.
pub(in crate::api::exams) async fn get_exam(
    Path(exam_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ExamDetailResponse>, ApiError> {
    let exam = repositories::catalog::find_exam(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    let question_count = repositories::catalog::question_count(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;

    Ok(Json(ExamDetailResponse {
        id: exam.id,
        title: exam.title,
        description: exam.description,
        time_limit_seconds: exam.time_limit_seconds,
        passing_score: exam.passing_score,
        randomize_questions: exam.randomize_questions,
        is_published: exam.is_published,
        created_at: format_primitive(exam.created_at),
        updated_at: format_primitive(exam.updated_at),
        question_count,
    }))
}

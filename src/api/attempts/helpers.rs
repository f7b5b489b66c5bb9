use std::collections::{HashMap, HashSet};

use crate::api::errors::ApiError;
pub(crate) use crate::core::time::primitive_now_utc as now_primitive;
use crate::db::models::{AttemptAnswer, AttemptQuestion, Exam, ExamAttempt};
use crate::db::types::AttemptStatus;
use crate::repositories;
use crate::schemas::attempt::{
    format_primitive, AttemptDetailResponse, AttemptOptionDetail, AttemptQuestionDetail,
};
use crate::services::scoring;

pub(crate) async fn fetch_exam(pool: &sqlx::PgPool, exam_id: &str) -> Result<Exam, ApiError> {
    repositories::catalog::find_exam(pool, exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

pub(crate) async fn fetch_attempt(
    pool: &sqlx::PgPool,
    attempt_id: &str,
) -> Result<ExamAttempt, ApiError> {
    repositories::attempts::find_by_id(pool, attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .ok_or_else(|| ApiError::NotFound("Attempt not found".to_string()))
}

/// Builds the review payload from the frozen snapshot. Option
/// correctness and per-question outcomes are revealed only once the
/// attempt is completed.
pub(crate) fn attempt_to_detail(
    attempt: ExamAttempt,
    exam: &Exam,
    questions: Vec<AttemptQuestion>,
    answers: Vec<AttemptAnswer>,
) -> AttemptDetailResponse {
    let completed = attempt.status == AttemptStatus::Completed;

    let mut answers_by_question: HashMap<String, Vec<AttemptAnswer>> = HashMap::new();
    for answer in answers {
        answers_by_question.entry(answer.attempt_question_id.clone()).or_default().push(answer);
    }

    let questions = questions
        .into_iter()
        .map(|question| {
            let options = answers_by_question.remove(&question.id).unwrap_or_default();

            let answered_correctly = completed.then(|| {
                let correct: HashSet<String> = options
                    .iter()
                    .filter(|option| option.is_correct)
                    .map(|option| option.option_id.clone())
                    .collect();
                let selected: HashSet<String> = options
                    .iter()
                    .filter(|option| option.is_selected)
                    .map(|option| option.option_id.clone())
                    .collect();
                scoring::question_is_correct(&correct, &selected)
            });

            AttemptQuestionDetail {
                question_id: question.question_id,
                position: question.position,
                text: question.question_text,
                is_flagged: question.is_flagged,
                answered_correctly,
                options: options
                    .into_iter()
                    .map(|option| AttemptOptionDetail {
                        option_id: option.option_id,
                        text: option.option_text,
                        is_selected: option.is_selected,
                        is_correct: completed.then_some(option.is_correct),
                    })
                    .collect(),
            }
        })
        .collect();

    AttemptDetailResponse {
        id: attempt.id,
        user_id: attempt.user_id,
        exam_id: attempt.exam_id,
        status: attempt.status,
        score: attempt.score,
        passed: attempt.score.map(|score| scoring::is_passing(score, exam.passing_score)),
        time_limit_seconds: exam.time_limit_seconds,
        started_at: format_primitive(attempt.started_at),
        completed_at: attempt.completed_at.map(format_primitive),
        time_spent_seconds: attempt.time_spent_seconds,
        questions,
    }
}

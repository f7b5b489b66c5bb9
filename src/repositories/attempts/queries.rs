use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::{AttemptAnswer, AttemptQuestion, ExamAttempt};
use crate::db::types::AttemptStatus;

use super::types::{AnswerStateRow, AttemptSummaryRow, QuestionRef};

pub(crate) const COLUMNS: &str = "\
    id, user_id, exam_id, status, score, started_at, completed_at, \
    time_spent_seconds, created_at, updated_at";

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!("SELECT {COLUMNS} FROM exam_attempts WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Row-locks the attempt for the rest of the transaction so status
/// checks and the transition that follows are serialized against
/// concurrent writers.
pub(crate) async fn lock_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!(
        "SELECT {COLUMNS} FROM exam_attempts WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_in_progress(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    exam_id: &str,
) -> Result<Option<ExamAttempt>, sqlx::Error> {
    sqlx::query_as::<_, ExamAttempt>(&format!(
        "SELECT {COLUMNS} FROM exam_attempts \
         WHERE user_id = $1 AND exam_id = $2 AND status = $3"
    ))
    .bind(user_id)
    .bind(exam_id)
    .bind(AttemptStatus::InProgress)
    .fetch_optional(executor)
    .await
}

/// Snapshot questions in attempt-local order. The order was fixed at
/// creation and is never re-derived from the catalog.
pub(crate) async fn list_questions(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Vec<AttemptQuestion>, sqlx::Error> {
    sqlx::query_as::<_, AttemptQuestion>(
        "SELECT id, attempt_id, question_id, position, question_text, is_flagged
         FROM attempt_questions
         WHERE attempt_id = $1
         ORDER BY position",
    )
    .bind(attempt_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_answers(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Vec<AttemptAnswer>, sqlx::Error> {
    sqlx::query_as::<_, AttemptAnswer>(
        "SELECT aa.id, aa.attempt_question_id, aa.option_id, aa.option_text,
                aa.is_correct, aa.is_selected, aa.position
         FROM attempt_answers aa
         JOIN attempt_questions aq ON aq.id = aa.attempt_question_id
         WHERE aq.attempt_id = $1
         ORDER BY aq.position, aa.position",
    )
    .bind(attempt_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn count_questions(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM attempt_questions WHERE attempt_id = $1")
        .bind(attempt_id)
        .fetch_one(executor)
        .await
}

/// Question-id resolution table for an incoming answer batch.
pub(crate) async fn question_refs(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Vec<QuestionRef>, sqlx::Error> {
    sqlx::query_as::<_, QuestionRef>(
        "SELECT id, question_id FROM attempt_questions WHERE attempt_id = $1",
    )
    .bind(attempt_id)
    .fetch_all(executor)
    .await
}

/// Everything scoring needs: the frozen correctness flags and the
/// current selection state, one row per snapshot option.
pub(crate) async fn answer_state(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Vec<AnswerStateRow>, sqlx::Error> {
    sqlx::query_as::<_, AnswerStateRow>(
        "SELECT aa.attempt_question_id, aa.option_id, aa.is_correct, aa.is_selected
         FROM attempt_answers aa
         JOIN attempt_questions aq ON aq.id = aa.attempt_question_id
         WHERE aq.attempt_id = $1",
    )
    .bind(attempt_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_by_exam(
    pool: &PgPool,
    exam_id: &str,
    status: Option<AttemptStatus>,
    skip: i64,
    limit: i64,
) -> Result<Vec<AttemptSummaryRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT a.id,
                a.user_id,
                a.exam_id,
                a.status,
                a.score,
                a.started_at,
                a.completed_at,
                a.time_spent_seconds,
                u.email AS user_email,
                u.full_name AS user_full_name
         FROM exam_attempts a
         JOIN users u ON u.id = a.user_id
         WHERE a.exam_id = ",
    );
    builder.push_bind(exam_id);

    if let Some(status) = status {
        builder.push(" AND a.status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY a.created_at DESC OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<AttemptSummaryRow>().fetch_all(pool).await
}

pub(crate) async fn count_by_exam(
    pool: &PgPool,
    exam_id: &str,
    status: Option<AttemptStatus>,
) -> Result<i64, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM exam_attempts WHERE exam_id = ");
    builder.push_bind(exam_id);

    if let Some(status) = status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

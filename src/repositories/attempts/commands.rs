use sqlx::{Postgres, Transaction};
use time::PrimitiveDateTime;

use crate::db::types::AttemptStatus;

use super::types::{CreateAttempt, SnapshotQuestion};

/// Serializes concurrent starts for the same (exam, user) pair within
/// their transactions. Released automatically at commit/rollback.
pub(crate) async fn acquire_start_lock(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
    user_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(format!("exam_attempt_start:{exam_id}:{user_id}"))
        .execute(executor)
        .await?;
    Ok(())
}

/// Inserts the attempt row. Returns false when the partial unique
/// index on (user_id, exam_id, in_progress) already holds a row, i.e.
/// a concurrent start won the race.
pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    attempt: CreateAttempt<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO exam_attempts (
            id, user_id, exam_id, status, started_at, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        ON CONFLICT DO NOTHING",
    )
    .bind(attempt.id)
    .bind(attempt.user_id)
    .bind(attempt.exam_id)
    .bind(attempt.status)
    .bind(attempt.started_at)
    .bind(attempt.created_at)
    .bind(attempt.updated_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Materializes the full question/option snapshot of a new attempt.
/// Runs inside the creation transaction: either every row lands or
/// none does.
pub(crate) async fn insert_snapshot(
    tx: &mut Transaction<'_, Postgres>,
    attempt_id: &str,
    questions: &[SnapshotQuestion],
) -> Result<(), sqlx::Error> {
    for question in questions {
        sqlx::query(
            "INSERT INTO attempt_questions (
                id, attempt_id, question_id, position, question_text, is_flagged
            ) VALUES ($1,$2,$3,$4,$5,FALSE)",
        )
        .bind(&question.id)
        .bind(attempt_id)
        .bind(&question.question_id)
        .bind(question.position)
        .bind(&question.question_text)
        .execute(&mut **tx)
        .await?;

        for answer in &question.answers {
            sqlx::query(
                "INSERT INTO attempt_answers (
                    id, attempt_question_id, option_id, option_text,
                    is_correct, is_selected, position
                ) VALUES ($1,$2,$3,$4,$5,FALSE,$6)",
            )
            .bind(&answer.id)
            .bind(&question.id)
            .bind(&answer.option_id)
            .bind(&answer.option_text)
            .bind(answer.is_correct)
            .bind(answer.position)
            .execute(&mut **tx)
            .await?;
        }
    }

    Ok(())
}

/// Rewrites the selection state of one snapshot question: options in
/// `selected_option_ids` become selected, every other option of the
/// question is cleared. Idempotent.
pub(crate) async fn update_selections(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_question_id: &str,
    selected_option_ids: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE attempt_answers
         SET is_selected = (option_id = ANY($1))
         WHERE attempt_question_id = $2",
    )
    .bind(selected_option_ids)
    .bind(attempt_question_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// The terminal transition. The status predicate makes it a
/// compare-and-swap: of two racing submits exactly one sees a row
/// update, the other observes zero rows and reports the conflict.
pub(crate) async fn complete(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
    score: i32,
    completed_at: PrimitiveDateTime,
    time_spent_seconds: Option<i32>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE exam_attempts
         SET status = $2, score = $3, completed_at = $4,
             time_spent_seconds = $5, updated_at = $4
         WHERE id = $1 AND status = $6",
    )
    .bind(attempt_id)
    .bind(AttemptStatus::Completed)
    .bind(score)
    .bind(completed_at)
    .bind(time_spent_seconds)
    .bind(AttemptStatus::InProgress)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn set_question_flag(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
    question_id: &str,
    is_flagged: bool,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE attempt_questions
         SET is_flagged = $1
         WHERE attempt_id = $2 AND question_id = $3",
    )
    .bind(is_flagged)
    .bind(attempt_id)
    .bind(question_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

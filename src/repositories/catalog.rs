//! Read-only access to the exam catalog. Exams, questions and options
//! are authored by the external catalog service; nothing here writes.

use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::{Exam, QuestionOption};

pub(crate) const EXAM_COLUMNS: &str = "\
    id, title, description, time_limit_seconds, passing_score, \
    randomize_questions, is_published, created_at, updated_at";

/// Exam summary joined with catalog and attempt counts, for listings.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ExamSummaryRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) time_limit_seconds: i32,
    pub(crate) passing_score: i32,
    pub(crate) randomize_questions: bool,
    pub(crate) is_published: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) question_count: i64,
    pub(crate) attempt_count: i64,
}

/// One entry of an exam's ordered question list.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ExamQuestionRow {
    pub(crate) question_id: String,
    pub(crate) position: i32,
    pub(crate) text: String,
}

pub(crate) async fn find_exam(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {EXAM_COLUMNS} FROM exams WHERE id = $1"))
        .bind(exam_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn question_count(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM exam_questions WHERE exam_id = $1")
        .bind(exam_id)
        .fetch_one(executor)
        .await
}

/// The exam's question list in authoring order.
pub(crate) async fn ordered_questions(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
) -> Result<Vec<ExamQuestionRow>, sqlx::Error> {
    sqlx::query_as::<_, ExamQuestionRow>(
        "SELECT eq.question_id, eq.position, q.text
         FROM exam_questions eq
         JOIN questions q ON q.id = eq.question_id
         WHERE eq.exam_id = $1
         ORDER BY eq.position",
    )
    .bind(exam_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn options_for_questions(
    executor: impl sqlx::PgExecutor<'_>,
    question_ids: &[String],
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, QuestionOption>(
        "SELECT id, question_id, text, is_correct, position
         FROM question_options
         WHERE question_id = ANY($1)
         ORDER BY question_id, position",
    )
    .bind(question_ids)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_exams(
    pool: &PgPool,
    is_published: Option<bool>,
    title: Option<&str>,
    skip: i64,
    limit: i64,
) -> Result<Vec<ExamSummaryRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT e.id, e.title, e.description, e.time_limit_seconds, e.passing_score,
                e.randomize_questions, e.is_published, e.created_at,
                (SELECT COUNT(*) FROM exam_questions eq WHERE eq.exam_id = e.id) AS question_count,
                (SELECT COUNT(*) FROM exam_attempts ea WHERE ea.exam_id = e.id) AS attempt_count
         FROM exams e
         WHERE TRUE",
    );

    if let Some(is_published) = is_published {
        builder.push(" AND e.is_published = ");
        builder.push_bind(is_published);
    }

    if let Some(title) = title {
        builder.push(" AND e.title ILIKE ");
        builder.push_bind(format!("%{title}%"));
    }

    builder.push(" ORDER BY e.created_at DESC OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<ExamSummaryRow>().fetch_all(pool).await
}

pub(crate) async fn count_exams(
    pool: &PgPool,
    is_published: Option<bool>,
    title: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM exams e WHERE TRUE");

    if let Some(is_published) = is_published {
        builder.push(" AND e.is_published = ");
        builder.push_bind(is_published);
    }

    if let Some(title) = title {
        builder.push(" AND e.title ILIKE ");
        builder.push_bind(format!("%{title}%"));
    }

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

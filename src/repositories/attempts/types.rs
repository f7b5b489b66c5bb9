use time::PrimitiveDateTime;

use crate::db::types::AttemptStatus;

pub(crate) struct CreateAttempt<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) status: AttemptStatus,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// One question of a freshly materialized snapshot, with its dense
/// option rows.
pub(crate) struct SnapshotQuestion {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) position: i32,
    pub(crate) question_text: String,
    pub(crate) answers: Vec<SnapshotAnswer>,
}

pub(crate) struct SnapshotAnswer {
    pub(crate) id: String,
    pub(crate) option_id: String,
    pub(crate) option_text: String,
    pub(crate) is_correct: bool,
    pub(crate) position: i32,
}

/// Attempt summary joined with the owning user, for listings.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AttemptSummaryRow {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) exam_id: String,
    pub(crate) status: AttemptStatus,
    pub(crate) score: Option<i32>,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) completed_at: Option<PrimitiveDateTime>,
    pub(crate) time_spent_seconds: Option<i32>,
    pub(crate) user_email: String,
    pub(crate) user_full_name: String,
}

/// Selection state of one snapshot option row, used by scoring.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AnswerStateRow {
    pub(crate) attempt_question_id: String,
    pub(crate) option_id: String,
    pub(crate) is_correct: bool,
    pub(crate) is_selected: bool,
}

/// Maps a snapshot question back to its catalog question id, used to
/// resolve incoming answer batches.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionRef {
    pub(crate) id: String,
    pub(crate) question_id: String,
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{AttemptStatus, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Exam {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) time_limit_seconds: i32,
    pub(crate) passing_score: i32,
    pub(crate) randomize_questions: bool,
    pub(crate) is_published: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) explanation: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuestionOption {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) text: String,
    pub(crate) is_correct: bool,
    pub(crate) position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ExamAttempt {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) exam_id: String,
    pub(crate) status: AttemptStatus,
    pub(crate) score: Option<i32>,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) completed_at: Option<PrimitiveDateTime>,
    pub(crate) time_spent_seconds: Option<i32>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// One question of an attempt's frozen snapshot. `position` is the
/// attempt-local order and never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AttemptQuestion {
    pub(crate) id: String,
    pub(crate) attempt_id: String,
    pub(crate) question_id: String,
    pub(crate) position: i32,
    pub(crate) question_text: String,
    pub(crate) is_flagged: bool,
}

/// One option row of the snapshot, selected or not. `is_correct` is
/// copied from the catalog at attempt creation; scoring reads it from
/// here, never from the live catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AttemptAnswer {
    pub(crate) id: String,
    pub(crate) attempt_question_id: String,
    pub(crate) option_id: String,
    pub(crate) option_text: String,
    pub(crate) is_correct: bool,
    pub(crate) is_selected: bool,
    pub(crate) position: i32,
}

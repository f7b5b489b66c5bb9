use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub(crate) use crate::core::time::format_primitive;
use crate::db::types::AttemptStatus;

#[derive(Debug, Serialize)]
pub(crate) struct StartAttemptResponse {
    pub(crate) attempt_id: String,
    pub(crate) time_limit_seconds: i32,
    pub(crate) question_count: i64,
    pub(crate) resumed: bool,
}

/// A selection for one question: clients send either a single option id
/// or an array of option ids for multi-answer questions.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum AnswerSelection {
    One(String),
    Many(Vec<String>),
}

impl AnswerSelection {
    pub(crate) fn into_option_ids(self) -> Vec<String> {
        match self {
            AnswerSelection::One(option_id) => vec![option_id],
            AnswerSelection::Many(option_ids) => option_ids,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordAnswersRequest {
    pub(crate) answers: HashMap<String, AnswerSelection>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct SubmitAttemptRequest {
    #[serde(default)]
    #[serde(alias = "timeSpentSeconds")]
    #[validate(range(min = 0, message = "time_spent_seconds must be non-negative"))]
    pub(crate) time_spent_seconds: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitAttemptResponse {
    pub(crate) attempt_id: String,
    pub(crate) score: i32,
    pub(crate) total_questions: i32,
    pub(crate) correct_count: i32,
    pub(crate) passed: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlagQuestionRequest {
    #[serde(alias = "isFlagged")]
    pub(crate) is_flagged: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptOptionDetail {
    pub(crate) option_id: String,
    pub(crate) text: String,
    pub(crate) is_selected: bool,
    /// Present only once the attempt is completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) is_correct: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptQuestionDetail {
    pub(crate) question_id: String,
    pub(crate) position: i32,
    pub(crate) text: String,
    pub(crate) is_flagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) answered_correctly: Option<bool>,
    pub(crate) options: Vec<AttemptOptionDetail>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptDetailResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) exam_id: String,
    pub(crate) status: AttemptStatus,
    pub(crate) score: Option<i32>,
    pub(crate) passed: Option<bool>,
    pub(crate) time_limit_seconds: i32,
    pub(crate) started_at: String,
    pub(crate) completed_at: Option<String>,
    pub(crate) time_spent_seconds: Option<i32>,
    pub(crate) questions: Vec<AttemptQuestionDetail>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptSummaryResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) user_email: String,
    pub(crate) user_full_name: String,
    pub(crate) exam_id: String,
    pub(crate) status: AttemptStatus,
    pub(crate) score: Option<i32>,
    pub(crate) started_at: String,
    pub(crate) completed_at: Option<String>,
    pub(crate) time_spent_seconds: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListAttemptsQuery {
    #[serde(default)]
    pub(crate) status: Option<AttemptStatus>,
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    pub(crate) limit: i64,
}

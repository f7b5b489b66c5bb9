use serde::{Deserialize, Serialize};

pub(crate) use crate::core::time::format_primitive;

#[derive(Debug, Serialize)]
pub(crate) struct ExamSummaryResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) time_limit_seconds: i32,
    pub(crate) passing_score: i32,
    pub(crate) randomize_questions: bool,
    pub(crate) is_published: bool,
    pub(crate) created_at: String,
    pub(crate) question_count: i64,
    pub(crate) attempt_count: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamDetailResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) time_limit_seconds: i32,
    pub(crate) passing_score: i32,
    pub(crate) randomize_questions: bool,
    pub(crate) is_published: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
    pub(crate) question_count: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListExamsQuery {
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    pub(crate) limit: i64,
    #[serde(default)]
    #[serde(alias = "isPublished")]
    pub(crate) is_published: Option<bool>,
    #[serde(default)]
    pub(crate) title: Option<String>,
}

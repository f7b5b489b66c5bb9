mod answers;
mod helpers;
mod review;
mod start;
mod submit;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::core::state::AppState;

pub(in crate::api) use review::list_exam_attempts;
pub(in crate::api) use start::start_attempt;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:attempt_id", get(review::get_attempt))
        .route("/:attempt_id/answers", put(answers::record_answers))
        .route("/:attempt_id/submit", post(submit::submit_attempt))
        .route("/:attempt_id/questions/:question_id/flag", put(review::flag_question))
}

#[cfg(test)]
mod tests;

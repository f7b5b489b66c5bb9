mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::attempts;
use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_exams))
        .route("/:exam_id", get(handlers::get_exam))
        .route(
            "/:exam_id/attempts",
            post(attempts::start_attempt).get(attempts::list_exam_attempts),
        )
}

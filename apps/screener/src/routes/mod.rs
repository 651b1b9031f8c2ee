pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::dashboard::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState, upload_body_limit: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/analyze",
            post(handlers::handle_analyze).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/api/v1/analysis", get(handlers::handle_get_analysis))
        .route("/api/v1/analysis/cancel", post(handlers::handle_cancel))
        .route(
            "/api/v1/results/:index/select",
            post(handlers::handle_select_result),
        )
        .route(
            "/api/v1/results/selection",
            delete(handlers::handle_close_detail),
        )
        .route(
            "/api/v1/job-description/check",
            post(handlers::handle_check_job_description),
        )
        .with_state(state)
}

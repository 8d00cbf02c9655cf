use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use core_bta::health_check;
use tower_http::trace::TraceLayer;

use data_model_bta::api::RootResponse;

use crate::state::AppState;

pub mod analyze;
pub mod jobs;
pub mod logging_middleware;
pub mod results;
pub mod users;

pub const ROOT_MESSAGE: &str = "Blood Test Report Analyser API is running";

//
// Router
//

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(get_root))
        .route("/health", get(health_check))
        .route("/api/analyze", post(analyze::post_analyze))
        .route("/api/analyze/async", post(analyze::post_analyze_async))
        .route("/api/jobs/in_progress", get(jobs::get_in_progress_jobs))
        .route("/api/jobs/{job_id}", get(jobs::get_job))
        .route("/api/jobs/{job_id}/result", get(jobs::get_job_result))
        .route("/api/results/{id}", get(results::get_result))
        .route("/api/users", post(users::post_user))
        .route("/api/users/{id}", get(users::get_user))
        .route("/api/users/{id}/results", get(users::get_user_results))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        // Custom route access logging
        .layer(middleware::from_fn(logging_middleware::log_route_access))
        // Tracing middleware
        .layer(TraceLayer::new_for_http())
}

/// GET / - Liveness message
pub async fn get_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

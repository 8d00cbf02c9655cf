use std::time::Instant;

use axum::{
    extract::Request,
    http::{StatusCode, header::CONTENT_LENGTH},
    middleware::Next,
    response::Response,
};

/// Logs every request once it is answered: warn for 4xx, error for 5xx.
/// Successful health checks only show up at debug level.
pub async fn log_route_access(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    // uploads make this the interesting number for /api/analyze
    let request_bytes = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(%method, %path, status = status.as_u16(), request_bytes, duration_ms);
    } else if status.is_client_error() {
        tracing::warn!(%method, %path, status = status.as_u16(), request_bytes, duration_ms);
    } else if is_quiet(&path, status) {
        tracing::debug!(%method, %path, status = status.as_u16(), duration_ms);
    } else {
        tracing::info!(%method, %path, status = status.as_u16(), request_bytes, duration_ms);
    }

    response
}

fn is_quiet(path: &str, status: StatusCode) -> bool {
    path == "/health" && status.is_success()
}

//! Request Logging
//! Mission: One structured line per API request

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{info, warn};

/// Paths too noisy to log; probes hit them every few seconds
const QUIET_PATHS: &[&str] = &["/health"];

/// Log method, path, status, and latency for every request.
///
/// Server errors log at warn so they stand out under the default filter;
/// everything else, client errors included, logs at info.
pub async fn request_logging(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    if QUIET_PATHS.contains(&path.as_str()) {
        return next.run(req).await;
    }

    let started = Instant::now();
    let response = next.run(req).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), latency_ms, "Request failed");
    } else {
        info!(%method, %path, status = status.as_u16(), latency_ms, "Request handled");
    }

    response
}

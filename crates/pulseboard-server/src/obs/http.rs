//! Timing/labeling middleware wrapped around every route.
//!
//! Runs after the handler has produced a response, including error and
//! fallback responses, so every request lands in the HTTP counter.

use axum::extract::{MatchedPath, Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use tokio::time::Instant;

use crate::app_state::AppState;

/// Endpoint label for requests that matched no route.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Method label for anything outside the standard HTTP methods.
pub const OTHER_METHOD: &str = "other";

const STANDARD_METHODS: [&str; 9] = [
    "GET", "HEAD", "POST", "PUT", "DELETE", "PATCH", "OPTIONS", "CONNECT", "TRACE",
];

fn method_label(method: &Method) -> &'static str {
    STANDARD_METHODS
        .iter()
        .copied()
        .find(|m| *m == method.as_str())
        .unwrap_or(OTHER_METHOD)
}

pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    // fixed label sets for method and route, so clients cannot grow the family
    let method = method_label(req.method());
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_owned());

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let latency = start.elapsed();
    if let Err(e) = state.telemetry().observe_request(method, &endpoint, status) {
        tracing::error!(error = %e, "failed to record request");
    }
    tracing::debug!(
        %method,
        %endpoint,
        status,
        latency_ms = latency.as_secs_f64() * 1000.0,
        "request completed"
    );

    response
}

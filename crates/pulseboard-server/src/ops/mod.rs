//! HTTP endpoints.
//!
//! - `/`        : static dashboard page
//! - `/metrics` : Prometheus text format
//! - `/health`  : liveness, no metric side effects

pub mod page;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use pulseboard_core::metrics::CONTENT_TYPE;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::obs::collector;

pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let t = state.telemetry();
    t.requests().inc(&[])?;
    t.dashboard_views().inc(&[])?;
    Ok(Html(state.dashboard_html().to_owned()))
}

pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    state.telemetry().requests().inc(&[])?;
    // best effort: a failed read still renders with stale process values
    collector::refresh_bounded(&state).await;
    let body = state.telemetry().render();

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response())
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

//! Axum router wiring.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, obs, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ops::dashboard))
        .route("/metrics", get(ops::metrics))
        .route("/health", get(ops::health))
        .fallback(ops::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), obs::http::track_requests))
        .with_state(state)
}

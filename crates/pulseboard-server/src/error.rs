//! HTTP mapping for handler errors.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use pulseboard_core::PulseError;

/// Handler error; always rendered as a 500 so the request is still counted.
#[derive(Debug)]
pub struct ApiError(pub PulseError);

impl From<PulseError> for ApiError {
    fn from(e: PulseError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(code = self.0.code().as_str(), error = %self.0, "handler failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("internal error: {}", self.0.code().as_str()),
        )
            .into_response()
    }
}

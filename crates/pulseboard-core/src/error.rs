//! Shared error type across pulseboard crates.

use thiserror::Error;

/// Stable error codes (used in logs and HTTP error bodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Metric name registered twice.
    DuplicateName,
    /// Metric or label name is not a valid Prometheus identifier.
    InvalidName,
    /// Negative (or NaN) amount passed to a counter.
    InvalidAmount,
    /// Label values do not match the declared label names.
    LabelArity,
    /// OS process statistics could not be read.
    ProcessStatsUnavailable,
    /// Invalid configuration.
    BadConfig,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::DuplicateName => "DUPLICATE_NAME",
            ErrorCode::InvalidName => "INVALID_NAME",
            ErrorCode::InvalidAmount => "INVALID_AMOUNT",
            ErrorCode::LabelArity => "LABEL_ARITY",
            ErrorCode::ProcessStatsUnavailable => "PROCESS_STATS_UNAVAILABLE",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PulseError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("metric already registered: {0}")]
    DuplicateName(String),
    #[error("invalid metric or label name: {0}")]
    InvalidName(String),
    #[error("counter increment must be non-negative, got {0}")]
    InvalidAmount(f64),
    #[error("metric {metric} expects {expected} label values, got {got}")]
    LabelArity {
        metric: String,
        expected: usize,
        got: usize,
    },
    #[error("process stats unavailable: {0}")]
    ProcessStatsUnavailable(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl PulseError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            PulseError::DuplicateName(_) => ErrorCode::DuplicateName,
            PulseError::InvalidName(_) => ErrorCode::InvalidName,
            PulseError::InvalidAmount(_) => ErrorCode::InvalidAmount,
            PulseError::LabelArity { .. } => ErrorCode::LabelArity,
            PulseError::ProcessStatsUnavailable(_) => ErrorCode::ProcessStatsUnavailable,
            PulseError::BadConfig(_) => ErrorCode::BadConfig,
            PulseError::Internal(_) => ErrorCode::Internal,
        }
    }
}

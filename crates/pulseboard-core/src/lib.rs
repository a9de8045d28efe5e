//! pulseboard core: metric registry, Prometheus text exposition, and process
//! statistics.
//!
//! This crate owns the counters and gauges served by the dashboard and renders
//! them on demand. It carries no HTTP or async runtime dependencies so the
//! registry can be constructed and exercised in isolation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible paths
//! surface as `PulseError`/`Result` so a scrape never brings the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;
pub mod process;
pub mod telemetry;

pub use error::{ErrorCode, PulseError, Result};
pub use metrics::{Counter, Gauge, MetricKind, Registry};
pub use telemetry::Telemetry;

//! pulseboard server library entry.
//!
//! Wires config, the shared telemetry registry, request instrumentation and
//! the dashboard/metrics/health routes. Consumed by the binary (`main.rs`)
//! and by integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;

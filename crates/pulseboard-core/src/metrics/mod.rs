//! Metric registry: counters and gauges with optional label dimensions.
//!
//! Each registered instrument is a family. Label values index into a
//! `DashMap` of atomic cells; a separate append-only list keeps first-use
//! order so rendering is deterministic. Registration takes `&mut Registry`,
//! so the schema is fixed before the registry is shared across threads.

mod family;
mod handles;
mod registry;
mod text;

pub use family::{validate_metric_name, MetricFamily, MetricKind};
pub use handles::{BoundCounter, BoundGauge, Counter, Gauge};
pub use registry::Registry;
pub use text::{format_value, CONTENT_TYPE};

//! Application metric schema.
//!
//! `Telemetry` owns the registry and the handles for every metric the
//! dashboard exposes. It is built once at startup and shared by reference.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;
use crate::metrics::{Counter, Gauge, Registry};
use crate::process::{self, ProcessStats};

/// Default name of the per-request HTTP counter (kept for existing scrapers).
pub const DEFAULT_HTTP_REQUESTS_METRIC: &str = "flask_http_request_total";

/// Label names of the per-request HTTP counter.
pub const HTTP_REQUEST_LABELS: [&str; 3] = ["method", "endpoint", "status"];

struct ProcessMetrics {
    cpu_seconds: Counter,
    virtual_memory: Gauge,
    resident_memory: Gauge,
    start_time: Gauge,
    open_fds: Gauge,
    max_fds: Gauge,
}

impl ProcessMetrics {
    fn register(registry: &mut Registry) -> Result<Self> {
        Ok(Self {
            cpu_seconds: registry.register_counter(
                "process_cpu_seconds_total",
                "Total user and system CPU time spent in seconds.",
                &[],
            )?,
            virtual_memory: registry.register_gauge(
                "process_virtual_memory_bytes",
                "Virtual memory size in bytes.",
                &[],
            )?,
            resident_memory: registry.register_gauge(
                "process_resident_memory_bytes",
                "Resident memory size in bytes.",
                &[],
            )?,
            start_time: registry.register_gauge(
                "process_start_time_seconds",
                "Start time of the process since unix epoch in seconds.",
                &[],
            )?,
            open_fds: registry.register_gauge(
                "process_open_fds",
                "Number of open file descriptors.",
                &[],
            )?,
            max_fds: registry.register_gauge(
                "process_max_fds",
                "Maximum number of open file descriptors.",
                &[],
            )?,
        })
    }

    fn apply(&self, stats: &ProcessStats) -> Result<()> {
        self.cpu_seconds.advance_to(&[], stats.cpu_seconds)?;
        self.virtual_memory.set(&[], stats.virtual_memory_bytes)?;
        self.resident_memory.set(&[], stats.resident_memory_bytes)?;
        // 0 is the sentinel where descriptors cannot be counted
        self.open_fds.set(&[], stats.open_fds.unwrap_or(0.0))?;
        self.max_fds.set(&[], stats.max_fds.unwrap_or(0.0))?;
        Ok(())
    }
}

/// Registry plus the fixed application schema.
pub struct Telemetry {
    registry: Registry,
    requests: Counter,
    dashboard_views: Counter,
    http_requests: Counter,
    process: ProcessMetrics,
}

impl Telemetry {
    /// Build the registry with the default HTTP counter name.
    pub fn new() -> Result<Self> {
        Self::with_http_metric(DEFAULT_HTTP_REQUESTS_METRIC)
    }

    /// Build the registry. Any registration error is a schema bug and should
    /// abort startup.
    pub fn with_http_metric(http_requests_metric: &str) -> Result<Self> {
        let mut registry = Registry::new();

        let requests = registry.register_counter("app_requests_total", "Total app requests", &[])?;
        let dashboard_views =
            registry.register_counter("app_dashboard_views_total", "Dashboard page views", &[])?;
        let http_requests = registry.register_counter(
            http_requests_metric,
            "Total HTTP requests",
            &HTTP_REQUEST_LABELS,
        )?;
        let process = ProcessMetrics::register(&mut registry)?;

        let build_info = registry.register_gauge(
            "pulseboard_build_info",
            "Build information of the running binary.",
            &["name", "version"],
        )?;
        build_info.set(&[env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")], 1.0)?;

        let start = process::process_start_time().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "falling back to wall clock for process start time");
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs_f64()
        });
        process.start_time.set(&[], start)?;

        Ok(Self {
            registry,
            requests,
            dashboard_views,
            http_requests,
            process,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// `app_requests_total`
    pub fn requests(&self) -> &Counter {
        &self.requests
    }

    /// `app_dashboard_views_total`
    pub fn dashboard_views(&self) -> &Counter {
        &self.dashboard_views
    }

    /// Per-request counter labelled by method, endpoint and status.
    pub fn http_requests(&self) -> &Counter {
        &self.http_requests
    }

    /// Record one completed HTTP request.
    pub fn observe_request(&self, method: &str, endpoint: &str, status: u16) -> Result<()> {
        let status = status.to_string();
        self.http_requests.inc(&[method, endpoint, status.as_str()])
    }

    /// Read live OS statistics into the process gauges.
    ///
    /// On `ProcessStatsUnavailable` nothing is written and the previous values
    /// stay in place.
    pub fn refresh_process_metrics(&self) -> Result<()> {
        self.refresh_process_metrics_with(process::read_process_stats)
    }

    /// Same as `refresh_process_metrics`, reading through `read`.
    pub fn refresh_process_metrics_with<F>(&self, read: F) -> Result<()>
    where
        F: FnOnce() -> Result<ProcessStats>,
    {
        let stats = read()?;
        self.apply_process_stats(&stats)
    }

    /// Write an already-collected reading into the process gauges.
    pub fn apply_process_stats(&self, stats: &ProcessStats) -> Result<()> {
        self.process.apply(stats)
    }

    /// Render the full registry.
    pub fn render(&self) -> String {
        self.registry.render()
    }
}

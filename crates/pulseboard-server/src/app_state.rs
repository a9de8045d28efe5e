//! Shared application state.
//!
//! The telemetry registry is constructed here, once, from config and then
//! shared by every handler. Schema errors surface as `Result` so `main` can
//! abort startup cleanly.

use std::sync::Arc;
use std::time::Duration;

use pulseboard_core::error::Result;
use pulseboard_core::process::{self, ProcessStats};
use pulseboard_core::Telemetry;

use crate::config::PulseConfig;
use crate::ops::page;

/// Source of process statistics for the refresh path.
pub type StatsReader = Arc<dyn Fn() -> Result<ProcessStats> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: PulseConfig,
    telemetry: Telemetry,
    dashboard_html: String,
    stats_reader: StatsReader,
}

impl AppState {
    pub fn new(cfg: PulseConfig) -> Result<Self> {
        Self::with_stats_reader(cfg, Arc::new(process::read_process_stats))
    }

    /// Build state with a custom process-statistics source.
    pub fn with_stats_reader(cfg: PulseConfig, stats_reader: StatsReader) -> Result<Self> {
        let telemetry = Telemetry::with_http_metric(&cfg.metrics.http_requests_metric)?;
        let dashboard_html = page::render_page(&cfg.dashboard.title);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                telemetry,
                dashboard_html,
                stats_reader,
            }),
        })
    }

    pub fn cfg(&self) -> &PulseConfig {
        &self.inner.cfg
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.inner.telemetry
    }

    pub fn dashboard_html(&self) -> &str {
        &self.inner.dashboard_html
    }

    pub fn stats_reader(&self) -> &StatsReader {
        &self.inner.stats_reader
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.inner.cfg.server.refresh_timeout_ms)
    }

    /// `None` when the background collector is disabled.
    pub fn collector_interval(&self) -> Option<Duration> {
        match self.inner.cfg.server.collector_interval_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

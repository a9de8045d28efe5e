use std::net::SocketAddr;

use serde::Deserialize;
use pulseboard_core::error::{PulseError, Result};
use pulseboard_core::metrics::validate_metric_name;
use pulseboard_core::telemetry::DEFAULT_HTTP_REQUESTS_METRIC;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PulseConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub dashboard: DashboardSection,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
            dashboard: DashboardSection::default(),
        }
    }
}

impl PulseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PulseError::BadConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.server.validate()?;
        self.metrics.validate()?;
        Ok(())
    }

    /// Override the listen address from a full socket address or a bare port
    /// (bound on all interfaces). The full address wins when both are set.
    pub fn apply_listen_override(&mut self, listen: Option<&str>, port: Option<&str>) -> Result<()> {
        if let Some(listen) = listen.filter(|s| !s.trim().is_empty()) {
            self.server.listen = listen.trim().to_string();
        } else if let Some(port) = port.filter(|s| !s.trim().is_empty()) {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| PulseError::BadConfig(format!("invalid port: {port}")))?;
            self.server.listen = format!("0.0.0.0:{port}");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Background process-metric refresh; 0 disables it.
    #[serde(default = "default_collector_interval_ms")]
    pub collector_interval_ms: u64,

    /// Upper bound on the process-stat read inside `/metrics`.
    #[serde(default = "default_refresh_timeout_ms")]
    pub refresh_timeout_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            collector_interval_ms: default_collector_interval_ms(),
            refresh_timeout_ms: default_refresh_timeout_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.collector_interval_ms != 0 && !(1000..=3_600_000).contains(&self.collector_interval_ms) {
            return Err(PulseError::BadConfig(
                "server.collector_interval_ms must be 0 or between 1000 and 3600000".into(),
            ));
        }
        if !(10..=30_000).contains(&self.refresh_timeout_ms) {
            return Err(PulseError::BadConfig(
                "server.refresh_timeout_ms must be between 10 and 30000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|_| PulseError::BadConfig(format!("server.listen is not a socket address: {}", self.listen)))
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_collector_interval_ms() -> u64 {
    15000
}
fn default_refresh_timeout_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Name of the per-request counter labelled by method/endpoint/status.
    #[serde(default = "default_http_requests_metric")]
    pub http_requests_metric: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            http_requests_metric: default_http_requests_metric(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        validate_metric_name(&self.http_requests_metric)
            .map_err(|e| PulseError::BadConfig(format!("metrics.http_requests_metric: {e}")))
    }
}

fn default_http_requests_metric() -> String {
    DEFAULT_HTTP_REQUESTS_METRIC.into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardSection {
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self { title: default_title() }
    }
}

fn default_title() -> String {
    "CEEYIT Monitoring Dashboard".into()
}

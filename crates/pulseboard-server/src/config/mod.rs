//! Config loader (strict parsing plus environment overrides).

pub mod schema;

use std::env;
use std::fs;

use pulseboard_core::error::{PulseError, Result};

pub use schema::{DashboardSection, MetricsSection, PulseConfig, ServerSection};

/// Path of the YAML config file.
pub const CONFIG_ENV: &str = "PULSEBOARD_CONFIG";
/// Full listen address override, e.g. `127.0.0.1:9000`.
pub const LISTEN_ENV: &str = "PULSEBOARD_LISTEN";
/// Port-only override; binds all interfaces.
pub const PORT_ENV: &str = "PORT";

pub fn load_from_file(path: &str) -> Result<PulseConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| PulseError::BadConfig(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<PulseConfig> {
    let cfg: PulseConfig = serde_yaml::from_str(s)
        .map_err(|e| PulseError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the runtime config: an explicit path, else `PULSEBOARD_CONFIG`,
/// else built-in defaults; then listen overrides from the environment.
pub fn load(cli_path: Option<&str>) -> Result<PulseConfig> {
    let path = cli_path.map(str::to_owned).or_else(|| env::var(CONFIG_ENV).ok());
    let mut cfg = match path.as_deref() {
        Some(p) => {
            tracing::info!(path = %p, "loading config file");
            load_from_file(p)?
        }
        None => PulseConfig::default(),
    };

    cfg.apply_listen_override(
        env::var(LISTEN_ENV).ok().as_deref(),
        env::var(PORT_ENV).ok().as_deref(),
    )?;
    cfg.validate()?;
    Ok(cfg)
}

//! pulseboard server
//!
//! - `GET /`        : dashboard page
//! - `GET /metrics` : Prometheus exposition of the process-wide registry
//! - `GET /health`  : liveness
//!
//! Config: `--config <path>` or `PULSEBOARD_CONFIG`; listen address from
//! `PULSEBOARD_LISTEN` or `PORT`.

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use pulseboard_core::error::{PulseError, Result};
use pulseboard_server::{app_state, config, obs, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "pulseboard-server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli_path = match args.as_slice() {
        [] => None,
        [flag, path] if flag == "--config" => Some(path.as_str()),
        _ => return Err(PulseError::BadConfig("usage: pulseboard-server [--config <path>]".into())),
    };

    let cfg = config::load(cli_path)?;
    let listen = cfg.server.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;
    if let Some(interval) = state.collector_interval() {
        obs::collector::spawn_collector(state.clone(), interval);
    }
    let app = router::build_router(state);

    tracing::info!(%listen, "pulseboard-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| PulseError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PulseError::Internal(format!("server failed: {e}")))?;

    tracing::info!("pulseboard-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}

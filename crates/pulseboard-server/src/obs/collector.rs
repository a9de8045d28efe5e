//! Process-metric refresh, bounded in time.
//!
//! `/proc` reads run on the blocking pool under a timeout. On failure or
//! timeout the gauges keep their previous values.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::app_state::AppState;

/// Outcome of one bounded refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Fresh,
    Stale,
}

/// Refresh process metrics, giving up after `state.refresh_timeout()`.
pub async fn refresh_bounded(state: &AppState) -> Refresh {
    let worker = state.clone();
    let read = tokio::task::spawn_blocking(move || {
        let reader = worker.stats_reader();
        worker.telemetry().refresh_process_metrics_with(|| reader())
    });

    match time::timeout(state.refresh_timeout(), read).await {
        Ok(Ok(Ok(()))) => Refresh::Fresh,
        Ok(Ok(Err(e))) => {
            tracing::warn!(code = e.code().as_str(), error = %e, "process stats read failed; serving stale values");
            Refresh::Stale
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "process stats task failed; serving stale values");
            Refresh::Stale
        }
        Err(_) => {
            tracing::warn!(timeout = ?state.refresh_timeout(), "process stats read timed out; serving stale values");
            Refresh::Stale
        }
    }
}

/// Spawn the periodic background refresh. It touches only per-cell atomics,
/// never a lock shared with request handling.
pub fn spawn_collector(state: AppState, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if refresh_bounded(&state).await == Refresh::Fresh {
                tracing::trace!("process metrics refreshed");
            }
        }
    })
}

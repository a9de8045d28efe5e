//! In-process route tests driven through `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::{middleware, Router};
use tower::ServiceExt;

use pulseboard_core::process::ProcessStats;
use pulseboard_core::PulseError;
use pulseboard_server::app_state::AppState;
use pulseboard_server::config::PulseConfig;
use pulseboard_server::error::ApiError;
use pulseboard_server::obs::collector::{refresh_bounded, Refresh};
use pulseboard_server::obs::http::track_requests;
use pulseboard_server::router::build_router;

fn app() -> (AppState, Router) {
    let state = AppState::new(PulseConfig::default()).unwrap();
    let router = build_router(state.clone());
    (state, router)
}

async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn health_ok_on_fresh_process() {
    let (state, router) = app();
    let (status, ct, body) = send(&router, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
    assert!(ct.unwrap().starts_with("text/plain"));
    assert_eq!(state.telemetry().requests().value(&[]).unwrap(), 0.0);
}

#[tokio::test]
async fn dashboard_then_metrics() {
    let (_state, router) = app();

    let (status, ct, body) = send(&router, "GET", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(ct.unwrap().starts_with("text/html"));
    assert!(body.contains("<a href=\"/metrics\">"));
    assert!(body.contains("CEEYIT Monitoring Dashboard"));

    let (status, ct, body) = send(&router, "GET", "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(ct.unwrap().starts_with("text/plain; version=0.0.4"));
    assert!(body.contains("\napp_requests_total 2\n"));
    assert!(body.contains("\napp_dashboard_views_total 1\n"));
    // the dashboard request completed before the scrape
    assert!(body.contains("flask_http_request_total{method=\"GET\",endpoint=\"/\",status=\"200\"} 1\n"));
    for name in [
        "process_cpu_seconds_total",
        "process_virtual_memory_bytes",
        "process_resident_memory_bytes",
        "process_start_time_seconds",
        "process_open_fds",
        "process_max_fds",
    ] {
        assert!(body.contains(&format!("# TYPE {name} ")), "{name}");
        assert!(body.contains(&format!("\n{name} ")), "{name}");
    }
}

#[tokio::test]
async fn every_response_is_counted_by_route() {
    let (state, router) = app();
    send(&router, "GET", "/health").await;
    send(&router, "GET", "/health").await;
    send(&router, "GET", "/metrics").await;

    let (status, _, _) = send(&router, "GET", "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&router, "POST", "/health").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let http = state.telemetry().http_requests();
    assert_eq!(http.value(&["GET", "/health", "200"]).unwrap(), 2.0);
    assert_eq!(http.value(&["GET", "/metrics", "200"]).unwrap(), 1.0);
    assert_eq!(http.value(&["GET", "unmatched", "404"]).unwrap(), 1.0);
    assert_eq!(http.value(&["POST", "/health", "405"]).unwrap(), 1.0);

    // health has no side effects on the app counters
    assert_eq!(state.telemetry().requests().value(&[]).unwrap(), 1.0);
}

#[tokio::test]
async fn concurrent_requests_lose_no_updates() {
    let (state, router) = app();
    let mut tasks = Vec::new();
    for _ in 0..16 {
        let router = router.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..25 {
                send(&router, "GET", "/").await;
            }
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }

    let t = state.telemetry();
    assert_eq!(t.requests().value(&[]).unwrap(), 400.0);
    assert_eq!(t.dashboard_views().value(&[]).unwrap(), 400.0);
    assert_eq!(t.http_requests().value(&["GET", "/", "200"]).unwrap(), 400.0);
}

#[tokio::test]
async fn renamed_http_metric() {
    let mut cfg = PulseConfig::default();
    cfg.metrics.http_requests_metric = "http_requests_total".into();
    let router = build_router(AppState::new(cfg).unwrap());

    send(&router, "GET", "/health").await;
    let (_, _, body) = send(&router, "GET", "/metrics").await;
    assert!(body.contains("http_requests_total{method=\"GET\",endpoint=\"/health\",status=\"200\"} 1\n"));
    assert!(!body.contains("flask_http_request_total"));
}

#[tokio::test]
async fn dashboard_title_is_escaped() {
    let mut cfg = PulseConfig::default();
    cfg.dashboard.title = "<Ops & Co>".into();
    let router = build_router(AppState::new(cfg).unwrap());

    let (_, _, body) = send(&router, "GET", "/").await;
    assert!(body.contains("<h1>&lt;Ops &amp; Co&gt;</h1>"));
}

#[test]
fn colliding_metric_name_aborts_startup() {
    let mut cfg = PulseConfig::default();
    cfg.metrics.http_requests_metric = "process_open_fds".into();
    let err = AppState::new(cfg).err().expect("must fail");
    assert_eq!(err.code().as_str(), "DUPLICATE_NAME");
}

#[tokio::test]
async fn nonstandard_methods_share_one_label() {
    let (state, router) = app();
    for i in 0..50 {
        let (status, _, _) = send(&router, &format!("X{i}"), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    send(&router, "GET", "/nope").await;

    let http = state.telemetry().http_requests();
    assert_eq!(http.value(&["other", "unmatched", "404"]).unwrap(), 50.0);
    assert_eq!(http.value(&["GET", "unmatched", "404"]).unwrap(), 1.0);
    assert_eq!(http.family().samples().len(), 2);
}

async fn failing_handler() -> Result<&'static str, ApiError> {
    Err(ApiError(PulseError::Internal("boom".into())))
}

#[tokio::test]
async fn handler_error_is_500_and_still_counted() {
    let state = AppState::new(PulseConfig::default()).unwrap();
    let router = Router::new()
        .route("/boom", get(failing_handler))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests));

    let (status, ct, body) = send(&router, "GET", "/boom").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(ct.unwrap().starts_with("text/plain"));
    assert!(body.contains("INTERNAL"));

    let text = state.telemetry().render();
    assert!(text.contains("flask_http_request_total{method=\"GET\",endpoint=\"/boom\",status=\"500\"} 1\n"));
}

fn state_with_reader<F>(refresh_timeout_ms: u64, reader: F) -> AppState
where
    F: Fn() -> pulseboard_core::Result<ProcessStats> + Send + Sync + 'static,
{
    let mut cfg = PulseConfig::default();
    cfg.server.refresh_timeout_ms = refresh_timeout_ms;
    AppState::with_stats_reader(cfg, Arc::new(reader)).unwrap()
}

#[tokio::test]
async fn metrics_serves_stale_values_when_stats_fail() {
    let state = state_with_reader(1000, || {
        Err(PulseError::ProcessStatsUnavailable("fd counting unsupported".into()))
    });
    assert_eq!(refresh_bounded(&state).await, Refresh::Stale);

    let router = build_router(state);
    let (status, _, body) = send(&router, "GET", "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\nprocess_open_fds 0\n"));
    assert!(body.contains("\napp_requests_total 1\n"));
    assert!(body.contains("# TYPE process_resident_memory_bytes gauge\n"));
}

#[tokio::test]
async fn metrics_does_not_wait_on_slow_stats() {
    let state = state_with_reader(20, || {
        std::thread::sleep(Duration::from_millis(300));
        Ok(ProcessStats::default())
    });
    assert_eq!(refresh_bounded(&state).await, Refresh::Stale);

    let router = build_router(state);
    let (status, _, body) = send(&router, "GET", "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\nprocess_open_fds 0\n"));
}

#[tokio::test]
async fn metrics_applies_injected_stats() {
    let state = state_with_reader(1000, || {
        Ok(ProcessStats {
            cpu_seconds: 1.5,
            virtual_memory_bytes: 8192.0,
            resident_memory_bytes: 2048.0,
            open_fds: None,
            max_fds: Some(1024.0),
        })
    });
    assert_eq!(refresh_bounded(&state).await, Refresh::Fresh);

    let router = build_router(state);
    let (status, _, body) = send(&router, "GET", "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\nprocess_resident_memory_bytes 2048\n"));
    assert!(body.contains("\nprocess_cpu_seconds_total 1.5\n"));
    assert!(body.contains("\nprocess_open_fds 0\n"));
    assert!(body.contains("\nprocess_max_fds 1024\n"));
}

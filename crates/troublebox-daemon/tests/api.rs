//! REST API tests driven through the router without binding a socket

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tower::ServiceExt;
use troublebox_daemon::{create_router, AppState};
use troublebox_engine::{AmbientConfig, EngineConfig, LoadEngine, Resource};

fn setup() -> (Router, LoadEngine, TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let engine = LoadEngine::new(EngineConfig {
        work_dir: tmp.path().join("orders"),
        sustained_duration_ms: 300,
        churn_hold_ms: 0,
        ambient: AmbientConfig {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap();
    let router = create_router(AppState::new(engine.clone()), true);
    (router, engine, tmp)
}

async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
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
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(router: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let (status, body) = send(router, method, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (router, _engine, _tmp) = setup();
    let (status, body) = send_json(&router, "GET", "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn status_includes_engine_snapshot() {
    let (router, _engine, _tmp) = setup();
    let (status, body) = send_json(&router, "GET", "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["engine"]["orders_total"], 0);
    assert_eq!(body["engine"]["active_cpu_tests"], 0);
}

#[tokio::test]
async fn normal_order_schedules_one_hundred() {
    let (router, engine, _tmp) = setup();
    let (status, body) = send_json(&router, "POST", "/order/normal").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "normal");
    assert_eq!(body["scheduled_count"], 100);

    let deadline = Instant::now() + Duration::from_secs(30);
    while engine.metrics().orders_total.get() < 100 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(engine.metrics().orders_total.get(), 100);
}

#[tokio::test]
async fn invalid_mode_is_rejected_without_side_effects() {
    let (router, engine, _tmp) = setup();

    for uri in [
        "/order/chaos",
        "/load/cpu/Normal",
        "/load/memory/extreme",
        "/load/disk/none",
    ] {
        let (status, body) = send_json(&router, "POST", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], "INVALID_LEVEL");
    }

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.orders_total, 0);
    assert_eq!(snapshot.disk_files_written, 0);
    assert_eq!(snapshot.cpu_load, 0.0);
    assert_eq!(snapshot.memory_load, 0.0);
}

#[tokio::test]
async fn metrics_endpoint_exposes_every_series() {
    let (router, _engine, _tmp) = setup();
    let response = router
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    for name in [
        "troublebox_orders_total",
        "troublebox_cpu_load",
        "troublebox_memory_load",
        "troublebox_disk_usage",
        "troublebox_disk_usage_percent",
        "troublebox_rps",
    ] {
        assert!(text.contains(name), "missing {name}");
    }
}

#[tokio::test]
async fn cpu_load_reports_intensity_and_publishes_gauge() {
    let (router, engine, _tmp) = setup();
    let (status, body) = send_json(&router, "POST", "/load/cpu/hardcore").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "hardcore");
    assert_eq!(body["intensity"], 5);
    assert_eq!(engine.metrics().cpu_load.get(), 50.0);

    let deadline = Instant::now() + Duration::from_secs(10);
    while engine.intensity().active_sustained(Resource::Cpu) > 0 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(engine.intensity().active_sustained(Resource::Cpu), 0);
}

#[tokio::test]
async fn memory_load_reports_intensity() {
    let (router, engine, _tmp) = setup();
    let (status, body) = send_json(&router, "POST", "/load/memory/normal").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intensity"], 1);
    assert_eq!(engine.metrics().memory_load.get(), 10.0);
}

#[tokio::test]
async fn disk_load_writes_a_file() {
    let (router, engine, _tmp) = setup();
    let (status, body) = send_json(&router, "POST", "/load/disk/nightmare").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "nightmare");

    let deadline = Instant::now() + Duration::from_secs(10);
    while engine.metrics().disk_files_written.get() < 1 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(engine.metrics().disk_files_written.get(), 1);
    assert_eq!(engine.metrics().orders_total.get(), 0);
}

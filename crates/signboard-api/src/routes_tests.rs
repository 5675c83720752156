use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use signboard_core::{ConfigStore, DisplayMode, NewConfig};
use signboard_renderer::ServedRenderer;
use signboard_runloop::{LoopConfig, LoopHandle, ReconciliationLoop};
use signboard_store::SqliteStore;

use super::*;

/// Real stack: in-memory store, served renderer, spawned loop. The polling
/// cadence is parked far away so only `/api/reload` drives ticks.
async fn test_app() -> (Router, Arc<SqliteStore>, LoopHandle) {
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    store
        .update_config(
            1,
            NewConfig {
                name: "Lobby".to_string(),
                display_mode: DisplayMode::Single,
                primary_url: "https://example.test/dashboard".to_string(),
                secondary_url: None,
                refresh_interval_secs: 300,
            },
        )
        .await
        .unwrap();

    let (renderer, document) = ServedRenderer::new();
    let (run_loop, applied) = ReconciliationLoop::new(store.clone(), Arc::new(renderer));
    let handle = run_loop.spawn(LoopConfig {
        poll_interval: Duration::from_secs(3600),
        trigger_queue: 8,
    });

    let state = Arc::new(AppState::new(
        applied,
        handle.reload_requester(),
        Some(document),
    ));
    (create_router(state), store, handle)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_status_reports_running_with_config() {
    let (app, _store, handle) = test_app().await;

    // The reload ack tells us the startup state is settled.
    app.clone().oneshot(get("/api/reload")).await.unwrap();

    let response = app.oneshot(get("/api/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "running");
    assert!(json["timestamp"].is_string());
    assert_eq!(json["currentConfig"]["id"], 1);
    assert_eq!(
        json["currentConfig"]["primary_url"],
        "https://example.test/dashboard"
    );

    handle.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_status_keeps_last_config_when_pointer_dangles() {
    let (app, store, handle) = test_app().await;
    app.clone().oneshot(get("/api/reload")).await.unwrap();

    // Point the display at a config that does not exist.
    store.set_current_config(999).await.unwrap();

    let response = app.clone().oneshot(get("/api/reload")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["message"], "No configuration found, display unchanged");

    // Status still reports the last render.
    let response = app.oneshot(get("/api/status")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["currentConfig"]["id"], 1);

    handle.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_reload_applies_pending_edit() {
    let (app, store, handle) = test_app().await;
    app.clone().oneshot(get("/api/reload")).await.unwrap();

    store
        .update_config(
            1,
            NewConfig {
                name: "Lobby".to_string(),
                display_mode: DisplayMode::Single,
                primary_url: "https://example.test/edited".to_string(),
                secondary_url: None,
                refresh_interval_secs: 300,
            },
        )
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/api/reload")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Display reloaded");

    let response = app.oneshot(get("/api/status")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(
        json["currentConfig"]["primary_url"],
        "https://example.test/edited"
    );

    handle.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_reload_when_unchanged_says_so() {
    let (app, _store, handle) = test_app().await;
    app.clone().oneshot(get("/api/reload")).await.unwrap();

    let response = app.oneshot(get("/api/reload")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Display already up to date");

    handle.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_reload_after_loop_stopped_is_500() {
    let (app, _store, handle) = test_app().await;
    handle.shutdown(Duration::from_secs(1)).await;

    let response = app.oneshot(get("/api/reload")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_root_serves_generated_document() {
    let (app, _store, handle) = test_app().await;
    app.clone().oneshot(get("/api/reload")).await.unwrap();

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains(r#"src="https://example.test/dashboard""#));

    handle.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_root_without_document_serves_placeholder() {
    let (app, _store, handle) = test_app().await;

    // A backend that renders elsewhere never hands the API a document.
    let state = Arc::new(AppState::new(
        // Fresh unapplied state is fine here; only the document matters.
        {
            let (_tx, rx) = tokio::sync::watch::channel(None);
            rx
        },
        handle.reload_requester(),
        None,
    ));
    let bare_app = create_router(state);
    drop(app);

    let response = bare_app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("No configuration found"));

    handle.shutdown(Duration::from_secs(1)).await;
}

//! HTTP route definitions and handlers.
//!
//! ```text
//! GET /api/status - daemon liveness plus the applied configuration
//! GET /api/reload - force a reconciliation pass, report its outcome
//! GET /           - generated display document (served backend only)
//! ```

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::error;

use signboard_core::SignageConfig;
use signboard_renderer::split_page;
use signboard_runloop::TickOutcome;

use crate::state::AppState;

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;

/// Create the control-surface router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(display_document))
        .route("/api/status", get(status))
        .route("/api/reload", get(reload))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    timestamp: String,
    #[serde(rename = "currentConfig")]
    current_config: Option<SignageConfig>,
}

/// `GET /api/status`
async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "running",
        timestamp: Utc::now().to_rfc3339(),
        current_config: state.applied.borrow().clone(),
    })
}

/// `GET /api/reload`
///
/// Waits for the forced tick to finish, so the response reflects what
/// actually happened rather than that a request was queued.
async fn reload(State(state): State<Arc<AppState>>) -> Response {
    match state.reload.request_reload().await {
        Ok(outcome) => {
            let message = match outcome {
                TickOutcome::Rendered => "Display reloaded",
                TickOutcome::Unchanged => "Display already up to date",
                TickOutcome::NoConfig => "No configuration found, display unchanged",
            };
            Json(serde_json::json!({ "message": message })).into_response()
        }
        Err(e) => {
            error!("forced reload failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// `GET /`
///
/// The served backend publishes its generated document here. Under the
/// other backends, or before the first render, a visitor gets the
/// placeholder page.
async fn display_document(State(state): State<Arc<AppState>>) -> Html<String> {
    let document = state
        .document
        .as_ref()
        .and_then(|doc| doc.borrow().clone());
    Html(document.unwrap_or_else(|| split_page::no_config_document().to_string()))
}

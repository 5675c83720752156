//! CDP wire message shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outgoing CDP command.
#[derive(Debug, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Incoming CDP message (command response or event).
#[derive(Debug, Deserialize)]
pub struct CdpMessage {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorBody>,
    pub method: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Error body of a failed CDP command.
#[derive(Debug, Deserialize)]
pub struct CdpErrorBody {
    pub code: i64,
    pub message: String,
}

/// Response of `GET /json/version` on the debug endpoint.
#[derive(Debug, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser", default)]
    pub browser: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

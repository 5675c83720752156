//! CDP error types.

use thiserror::Error;

/// Errors from the CDP client, page session, or Chrome launcher.
#[derive(Debug, Error)]
pub enum CdpError {
    #[error("Chrome not reachable at {0}")]
    ChromeNotAvailable(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("CDP protocol error {code}: {message}")]
    Protocol { code: i64, message: String },

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("javascript error: {0}")]
    JavaScript(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("CDP connection closed")]
    ConnectionClosed,

    #[error("no Chrome executable found")]
    ChromeNotFound,

    #[error("failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CdpResult<T> = Result<T, CdpError>;

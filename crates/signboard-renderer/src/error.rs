//! Renderer error types.

use thiserror::Error;

use signboard_cdp::CdpError;

/// Errors from a display backend.
///
/// Any of these aborts the current reconciliation tick without updating the
/// applied state; the display keeps showing whatever was last rendered.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("browser error: {0}")]
    Browser(#[from] CdpError),

    #[error("kiosk process error: {0}")]
    Process(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

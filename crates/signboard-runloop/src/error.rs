//! Reconciliation loop errors.
//!
//! All of these are caught at the tick boundary: they are logged, leave the
//! applied state untouched, and never crash the loop or the process.

use thiserror::Error;

use signboard_core::{ConfigError, StoreError};
use signboard_renderer::RenderError;

#[derive(Debug, Error)]
pub enum LoopError {
    /// Store unreachable or query failed; the tick is skipped.
    #[error("config resolution failed: {0}")]
    Resolve(#[from] StoreError),

    /// A fetched config violates an invariant; it never reaches a renderer.
    #[error(transparent)]
    Invalid(#[from] ConfigError),

    /// The render backend failed; the applied state is not updated so the
    /// next tick retries the same config.
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    /// The driver task is gone (shutdown already happened).
    #[error("reconciliation loop is not running")]
    NotRunning,
}

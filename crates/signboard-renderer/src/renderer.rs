//! The renderer contract.

use async_trait::async_trait;

use signboard_core::SplitOrientation;

use crate::error::RenderError;

/// A display output backend.
///
/// Exactly one instance drives the physical display at a time, and it is
/// only ever called from the serialized reconciliation tick, so
/// implementations may assume calls never overlap.
///
/// Operations are idempotent at the contract level: the loop's change
/// detection already suppresses redundant calls, and repeating a call with
/// identical arguments must not leave the display in a different state.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Show one full-viewport view of `url`, container chrome suppressed.
    async fn show_single(&self, url: &str, refresh_secs: u32) -> Result<(), RenderError>;

    /// Show two equal-share borderless panes.
    ///
    /// Horizontal orientation lays the panes out as a row, vertical as a
    /// column.
    async fn show_split(
        &self,
        orientation: SplitOrientation,
        primary_url: &str,
        secondary_url: &str,
        refresh_secs: u32,
    ) -> Result<(), RenderError>;

    /// Release the display resource (browser, process, ...).
    async fn shutdown(&self) -> Result<(), RenderError>;
}

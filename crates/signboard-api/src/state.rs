//! Application state shared across handlers.

use signboard_renderer::DisplayDocument;
use signboard_runloop::{AppliedState, ReloadRequester};

/// Handler state: read handles into the running loop.
///
/// `applied` and `document` are watch receivers, so handlers only ever see a
/// complete snapshot and never block the reconciliation loop.
pub struct AppState {
    /// Last successfully applied configuration.
    pub applied: AppliedState,
    /// Entry point for forcing a reconciliation pass.
    pub reload: ReloadRequester,
    /// Generated display document, present only for the served backend.
    pub document: Option<DisplayDocument>,
}

impl AppState {
    pub fn new(
        applied: AppliedState,
        reload: ReloadRequester,
        document: Option<DisplayDocument>,
    ) -> Self {
        Self {
            applied,
            reload,
            document,
        }
    }
}

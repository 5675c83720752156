//! # Signboard RunLoop
//!
//! The display reconciliation engine: the single source of truth for "what
//! should be on screen now".
//!
//! A single driver task owns the loop state and consumes two trigger
//! sources (a fixed-cadence interval and on-demand reload requests), so
//! tick executions are serialized by construction. Each tick fetches the
//! current configuration, compares it structurally against the last applied
//! one, and only on change drives the renderer. Errors never escape a tick:
//! the display fails static, keeping whatever was last rendered.

pub mod error;
mod run_loop;

pub use error::LoopError;
pub use run_loop::{
    AppliedState, LoopConfig, LoopHandle, ReconciliationLoop, ReloadRequester, TickOutcome,
};

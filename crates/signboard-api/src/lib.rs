//! # Signboard API
//!
//! The read-mostly control surface of the daemon: a small axum router that
//! reports the applied configuration, forces a reconciliation pass, and (for
//! the served backend) delivers the generated display document at `GET /`.
//!
//! Nothing here mutates configuration; edits happen against the store and
//! are picked up by the reconciliation loop on its next tick.

mod routes;
mod server;
mod state;

pub use routes::create_router;
pub use server::{InterfaceConfig, InterfaceServer};
pub use state::AppState;

//! # Signboard CDP
//!
//! Minimal Chrome DevTools Protocol plumbing for the browser display
//! backend:
//!
//! - [`ChromeLauncher`]: spawns a locked-down kiosk Chrome with remote
//!   debugging enabled and waits for the debug endpoint to come up.
//! - [`CdpClient`]: one WebSocket connection to the browser, request/response
//!   correlation by id.
//! - [`PageSession`]: the single page the signage display drives: navigate,
//!   settle waits, selector probing, form filling, content injection.
//!
//! This is deliberately not a general automation framework; it carries
//! exactly the operations the display reconciliation needs.

mod client;
pub mod error;
pub mod launcher;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use launcher::{ChromeLauncher, LauncherConfig};
pub use session::PageSession;

//! # Signboard Renderer
//!
//! The renderer capability: one contract, three interchangeable backends.
//!
//! - [`BrowserRenderer`]: owns a CDP-driven kiosk Chrome; navigates a single
//!   long-lived page, runs the login heuristic when credentials exist, and
//!   injects the split-screen document directly.
//! - [`ServedRenderer`]: controls no browser at all; publishes a generated
//!   display document which the control surface serves at `GET /` to
//!   whatever kiosk browser is pointed at it.
//! - [`KioskRenderer`]: spawns a locked-down browser process per target;
//!   changing the target means killing and respawning the process.
//!
//! The reconciliation loop picks a backend at startup and never branches on
//! its concrete type again.

mod browser;
mod credentials;
pub mod error;
mod kiosk;
pub mod login;
mod renderer;
mod served;
pub mod split_page;

pub use browser::{BrowserRenderer, STEALTH_SCRIPT};
pub use credentials::CredentialResolver;
pub use error::RenderError;
pub use kiosk::{KioskConfig, KioskRenderer};
pub use login::{LoginAutomator, LoginOutcome, PageDriver};
pub use renderer::Renderer;
pub use served::{DisplayDocument, ServedRenderer};

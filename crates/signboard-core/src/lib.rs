//! # Signboard Core
//!
//! Domain types and contracts shared across the signboard workspace:
//!
//! - [`SignageConfig`] / [`DisplayMode`]: what should be on screen.
//! - [`Credential`]: stored login material, looked up by exact hostname.
//! - [`ConfigStore`] / [`CredentialStore`]: the durable-store contracts the
//!   reconciliation loop depends on. Concrete backends live in
//!   `signboard-store`.
//!
//! This crate holds no I/O of its own.

pub mod config;
pub mod credential;
pub mod error;
pub mod store;

pub use config::{DisplayMode, NewConfig, SignageConfig, SplitOrientation};
pub use credential::Credential;
pub use error::{ConfigError, StoreError};
pub use store::{ConfigStore, CredentialStore};

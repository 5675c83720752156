//! # Signboard Store
//!
//! SQLite-backed realization of the [`ConfigStore`] and [`CredentialStore`]
//! contracts. One connection per process, driven through `tokio-rusqlite` so
//! store I/O never blocks the runtime.
//!
//! The schema is bootstrapped on open and seeded with a default single-page
//! configuration plus the current-config pointer, so a fresh deployment has
//! something to show immediately.
//!
//! [`ConfigStore`]: signboard_core::ConfigStore
//! [`CredentialStore`]: signboard_core::CredentialStore

pub mod schema;
mod store;

pub use store::SqliteStore;

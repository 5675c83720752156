//! Shared error types.

use thiserror::Error;

/// Errors raised by configuration parsing and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The stored display mode is not one of the enumerated values.
    #[error("unknown display mode: {0:?}")]
    UnknownDisplayMode(String),

    /// A fetched config violates a structural invariant.
    #[error("invalid config {id}: {reason}")]
    Invalid { id: i64, reason: String },
}

/// Errors raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store query error: {0}")]
    Query(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

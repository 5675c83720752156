//! Store contracts.
//!
//! The reconciliation loop only ever talks to these traits; the SQLite
//! realization lives in `signboard-store`, and tests substitute their own.

use async_trait::async_trait;

use crate::config::{NewConfig, SignageConfig};
use crate::credential::Credential;
use crate::error::StoreError;

/// Durable store of signage configurations and the current-config pointer.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch a configuration by id.
    async fn config(&self, id: i64) -> Result<Option<SignageConfig>, StoreError>;

    /// The currently selected configuration id.
    ///
    /// Defaults to 1 when the pointer record is absent.
    async fn current_config_id(&self) -> Result<i64, StoreError>;

    /// Fetch the currently selected configuration, if any resolves.
    async fn current_config(&self) -> Result<Option<SignageConfig>, StoreError> {
        let id = self.current_config_id().await?;
        self.config(id).await
    }

    /// List all configurations, newest first.
    async fn list_configs(&self) -> Result<Vec<SignageConfig>, StoreError>;

    /// Create a configuration, returning its id.
    async fn create_config(&self, config: NewConfig) -> Result<i64, StoreError>;

    /// Update a configuration in place.
    async fn update_config(&self, id: i64, config: NewConfig) -> Result<(), StoreError>;

    /// Delete a configuration.
    async fn delete_config(&self, id: i64) -> Result<(), StoreError>;

    /// Point the display at a different configuration.
    async fn set_current_config(&self, id: i64) -> Result<(), StoreError>;
}

/// Durable store of per-domain login credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up credentials by exact hostname.
    async fn credential_for(&self, domain: &str) -> Result<Option<Credential>, StoreError>;

    /// Insert or replace credentials for a hostname.
    async fn upsert_credential(
        &self,
        domain: &str,
        username: &str,
        password: &str,
    ) -> Result<(), StoreError>;

    /// Remove credentials for a hostname.
    async fn delete_credential(&self, domain: &str) -> Result<(), StoreError>;
}

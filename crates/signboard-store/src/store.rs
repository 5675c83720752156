//! SQLite store implementation.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use signboard_core::{
    ConfigStore, Credential, CredentialStore, DisplayMode, NewConfig, SignageConfig, StoreError,
};

use crate::schema::init_schema;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

/// Configuration id the pointer falls back to when unset.
const DEFAULT_CONFIG_ID: i64 = 1;

/// Raw row as stored, before the display mode is parsed.
struct ConfigRow {
    id: i64,
    name: String,
    display_mode: String,
    primary_url: String,
    secondary_url: Option<String>,
    refresh_interval: Option<i64>,
    created_at: String,
    updated_at: String,
}

impl ConfigRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            display_mode: row.get("display_mode")?,
            primary_url: row.get("primary_url")?,
            secondary_url: row.get("secondary_url")?,
            refresh_interval: row.get("refresh_interval")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn into_config(self) -> Result<SignageConfig, StoreError> {
        let display_mode = DisplayMode::parse(&self.display_mode)?;
        Ok(SignageConfig {
            id: self.id,
            name: self.name,
            display_mode,
            primary_url: self.primary_url,
            secondary_url: self.secondary_url,
            refresh_interval_secs: self
                .refresh_interval
                .unwrap_or(i64::from(NewConfig::DEFAULT_REFRESH_INTERVAL_SECS))
                .max(0) as u32,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const CONFIG_COLUMNS: &str =
    "id, name, display_mode, primary_url, secondary_url, refresh_interval, created_at, updated_at";

/// SQLite-backed config and credential store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a file-backed database.
    ///
    /// The parent directory is created if missing.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| StoreError::Connection(e.to_string()))?;
            }
        }

        let conn = Connection::open(&path)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        debug!("opened signage store at {}", path.display());
        Ok(Self { conn })
    }

    /// Open an in-memory database (tests, mostly).
    pub async fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(Self { conn })
    }

    /// Close the underlying connection.
    ///
    /// Best-effort: shutdown proceeds regardless of the outcome, the caller
    /// only logs failures.
    pub async fn close(self) -> Result<(), StoreError> {
        self.conn
            .close()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ConfigStore for SqliteStore {
    async fn config(&self, id: i64) -> Result<Option<SignageConfig>, StoreError> {
        let row = self
            .conn
            .call(move |conn| {
                let row = conn
                    .query_row(
                        &format!("SELECT {CONFIG_COLUMNS} FROM signage_configs WHERE id = ?1"),
                        params![id],
                        ConfigRow::from_row,
                    )
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        row.map(ConfigRow::into_config).transpose()
    }

    async fn current_config_id(&self) -> Result<i64, StoreError> {
        let value: Option<String> = self
            .conn
            .call(|conn| {
                let value = conn
                    .query_row(
                        "SELECT value FROM system_settings WHERE key = 'current_config_id'",
                        [],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(match value {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("current_config_id pointer is not an integer: {raw:?}");
                DEFAULT_CONFIG_ID
            }),
            None => DEFAULT_CONFIG_ID,
        })
    }

    async fn list_configs(&self) -> Result<Vec<SignageConfig>, StoreError> {
        let rows = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {CONFIG_COLUMNS} FROM signage_configs ORDER BY created_at DESC, id DESC"
                ))?;
                let rows = stmt
                    .query_map([], ConfigRow::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        rows.into_iter().map(ConfigRow::into_config).collect()
    }

    async fn create_config(&self, config: NewConfig) -> Result<i64, StoreError> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO signage_configs
                         (name, display_mode, primary_url, secondary_url, refresh_interval, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP)",
                    params![
                        config.name,
                        config.display_mode.as_str(),
                        config.primary_url,
                        config.secondary_url,
                        config.refresh_interval_secs,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn update_config(&self, id: i64, config: NewConfig) -> Result<(), StoreError> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE signage_configs
                     SET name = ?1, display_mode = ?2, primary_url = ?3, secondary_url = ?4,
                         refresh_interval = ?5, updated_at = CURRENT_TIMESTAMP
                     WHERE id = ?6",
                    params![
                        config.name,
                        config.display_mode.as_str(),
                        config.primary_url,
                        config.secondary_url,
                        config.refresh_interval_secs,
                        id,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn delete_config(&self, id: i64) -> Result<(), StoreError> {
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM signage_configs WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn set_current_config(&self, id: i64) -> Result<(), StoreError> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO system_settings (key, value, updated_at)
                     VALUES ('current_config_id', ?1, CURRENT_TIMESTAMP)
                     ON CONFLICT(key) DO UPDATE SET
                         value = excluded.value, updated_at = CURRENT_TIMESTAMP",
                    params![id.to_string()],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn credential_for(&self, domain: &str) -> Result<Option<Credential>, StoreError> {
        let domain = domain.to_string();
        self.conn
            .call(move |conn| {
                let cred = conn
                    .query_row(
                        "SELECT domain, username, password FROM auth_credentials WHERE domain = ?1",
                        params![domain],
                        |row| {
                            Ok(Credential {
                                domain: row.get(0)?,
                                username: row.get(1)?,
                                password: row.get(2)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(cred)
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn upsert_credential(
        &self,
        domain: &str,
        username: &str,
        password: &str,
    ) -> Result<(), StoreError> {
        let (domain, username, password) =
            (domain.to_string(), username.to_string(), password.to_string());
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO auth_credentials (domain, username, password, updated_at)
                     VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP)",
                    params![domain, username, password],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn delete_credential(&self, domain: &str) -> Result<(), StoreError> {
        let domain = domain.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM auth_credentials WHERE domain = ?1",
                    params![domain],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}

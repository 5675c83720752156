//! Database schema management.

use rusqlite::Connection;
use tokio_rusqlite::Error;

/// Initialize the database schema and seed defaults.
pub fn init_schema(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

const SCHEMA: &str = r#"
-- Signage configurations
CREATE TABLE IF NOT EXISTS signage_configs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    display_mode TEXT NOT NULL CHECK (display_mode IN ('single', 'split-horizontal', 'split-vertical')),
    primary_url TEXT NOT NULL,
    secondary_url TEXT,
    refresh_interval INTEGER DEFAULT 300,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

-- Login credentials, one row per hostname
CREATE TABLE IF NOT EXISTS auth_credentials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL,
    password TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

-- Single-row settings, including the current-config pointer
CREATE TABLE IF NOT EXISTS system_settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

INSERT INTO signage_configs (name, display_mode, primary_url)
    SELECT 'Default', 'single', 'https://www.google.com'
    WHERE NOT EXISTS (SELECT 1 FROM signage_configs);

INSERT OR IGNORE INTO system_settings (key, value) VALUES ('current_config_id', '1');
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        for table in ["signage_configs", "auth_credentials", "system_settings"] {
            let mut stmt = conn
                .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")
                .unwrap();
            assert!(stmt.exists([table]).unwrap(), "missing table {table}");
        }
    }

    #[test]
    fn test_schema_is_idempotent_and_seeds_once() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM signage_configs", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let pointer: String = conn
            .query_row(
                "SELECT value FROM system_settings WHERE key = 'current_config_id'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(pointer, "1");
    }

    #[test]
    fn test_display_mode_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO signage_configs (name, display_mode, primary_url)
             VALUES ('bad', 'split-diagonal', 'https://example.test')",
            [],
        );
        assert!(result.is_err());
    }
}

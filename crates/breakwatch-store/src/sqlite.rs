//! SQLite-based backend

use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::{KvBackend, StoreResult};

/// Durable backend: origin storage survives restarts of the tab host
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open or create a backend at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let backend = Self {
            conn: Mutex::new(conn),
        };
        backend.init_schema()?;
        Ok(backend)
    }

    /// Create an in-memory backend (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let backend = Self {
            conn: Mutex::new(conn),
        };
        backend.init_schema()?;
        Ok(backend)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS origin_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        debug!("Storage schema initialized");
        Ok(())
    }
}

impl KvBackend for SqliteBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock()?;

        let value = conn
            .query_row(
                "SELECT value FROM origin_storage WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn.lock()?;

        conn.execute(
            r#"
            INSERT INTO origin_storage (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;

        debug!(key, "Storage value set");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn.lock()?;
        conn.execute("DELETE FROM origin_storage WHERE key = ?", [key])?;
        debug!(key, "Storage value removed");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Storage lock poisoned");
                false
            }
        }
    }
}

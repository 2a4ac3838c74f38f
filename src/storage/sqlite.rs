//! SQLite storage implementation
//!
//! This module provides the database-backed implementation of the Backend trait.

use crate::storage::schema::initialize_backend_schema;
use crate::storage::traits::{Backend, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite persistence backend
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Creates a new SqliteBackend instance
    ///
    /// Missing parent directories are created.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteBackend)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_backend_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_backend_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))
    }
}

impl Backend for SqliteBackend {
    // ===== Content Cache =====

    fn save_content(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM content WHERE key = ?1", params![key])?;
        tx.execute(
            "INSERT INTO content (key, body, stored_at) VALUES (?1, ?2, ?3)",
            params![key, bytes, now],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn load_content(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        // A later write replaces the earlier row
        let body = self
            .conn()?
            .query_row(
                "SELECT body FROM content WHERE key = ?1 ORDER BY id DESC LIMIT 1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(body)
    }

    // ===== Redirect Map =====

    fn add_redirect(&self, from_url: &str, to_url: &str) -> StorageResult<()> {
        if from_url == to_url {
            return Ok(());
        }

        self.conn()?.execute(
            "INSERT INTO redirects (from_url, to_url) VALUES (?1, ?2)",
            params![from_url, to_url],
        )?;
        Ok(())
    }

    fn get_redirect(&self, url: &str) -> StorageResult<String> {
        let target: Option<String> = self
            .conn()?
            .query_row(
                "SELECT to_url FROM redirects WHERE from_url = ?1 ORDER BY id DESC LIMIT 1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(target.unwrap_or_else(|| url.to_string()))
    }

    // ===== Error Set =====

    fn add_error(&self, url: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn()?.execute(
            "INSERT OR IGNORE INTO errors (url, recorded_at) VALUES (?1, ?2)",
            params![url, now],
        )?;
        Ok(())
    }

    fn is_error(&self, url: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn()?
            .query_row(
                "SELECT 1 FROM errors WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

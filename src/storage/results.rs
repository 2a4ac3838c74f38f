//! Per-seed result cache
//!
//! Stores the complete document list of a crawled seed so a later run can
//! return it without traversing again. A hit bypasses depth and link limits
//! entirely: whatever was stored is returned as-is.

use crate::document::{CrawlResult, Document};
use crate::storage::schema::initialize_results_schema;
use crate::storage::traits::{StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed store of whole per-seed crawl results
pub struct ResultCache {
    conn: Mutex<Connection>,
}

impl ResultCache {
    /// Opens or creates the result cache at `path`
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        initialize_results_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory cache
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_results_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))
    }

    /// Returns the stored result for a seed, if any
    ///
    /// A seed stored with zero documents is a hit with an empty result.
    pub fn get(&self, seed: &str) -> StorageResult<Option<CrawlResult>> {
        let conn = self.conn()?;

        let stored: Option<String> = conn
            .query_row(
                "SELECT stored_at FROM crawl_seeds WHERE seed = ?1",
                params![seed],
                |row| row.get(0),
            )
            .optional()?;

        if stored.is_none() {
            return Ok(None);
        }

        let mut stmt = conn.prepare(
            "SELECT url, body FROM crawl_documents WHERE seed = ?1 ORDER BY position ASC",
        )?;

        let documents = stmt
            .query_map(params![seed], |row| {
                Ok(Document {
                    url: row.get(0)?,
                    body: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(CrawlResult {
            seed: seed.to_string(),
            documents,
        }))
    }

    /// Stores (or replaces) the result for its seed
    pub fn put(&self, result: &CrawlResult) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        tx.execute(
            "DELETE FROM crawl_documents WHERE seed = ?1",
            params![result.seed],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO crawl_seeds (seed, stored_at) VALUES (?1, ?2)",
            params![result.seed, now],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO crawl_documents (seed, position, url, body) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, document) in result.documents.iter().enumerate() {
                stmt.execute(params![
                    result.seed,
                    position as i64,
                    document.url,
                    document.body
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Number of seeds stored
    pub fn len(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM crawl_seeds", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

//! Storage module for persisting crawl data
//!
//! This module handles everything the crawler keeps between runs:
//! - The persistence backend trait and its filesystem and SQLite variants
//!   (content cache, redirect map, error set)
//! - SQLite schema management
//! - The optional per-seed result cache

mod filesystem;
mod results;
mod schema;
mod sqlite;
mod traits;

pub use filesystem::{content_digest, FilesystemBackend};
pub use results::ResultCache;
pub use sqlite::SqliteBackend;
pub use traits::{Backend, StorageError, StorageResult};

use crate::config::{BackendKind, StorageConfig};
use std::sync::Arc;

/// Opens the backend selected by the storage configuration
///
/// # Arguments
///
/// * `config` - Storage section of the configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn Backend>)` - Backend ready to be shared between traversals
/// * `Err(StorageError)` - Failed to create the directory or open the database
pub fn open_backend(config: &StorageConfig) -> StorageResult<Arc<dyn Backend>> {
    let backend: Arc<dyn Backend> = match config.backend {
        BackendKind::Filesystem => {
            tracing::debug!("Using filesystem backend at {}", config.path.display());
            Arc::new(FilesystemBackend::new(&config.path)?)
        }
        BackendKind::Sqlite => {
            tracing::debug!(
                "Using SQLite backend at {}",
                config.database_path.display()
            );
            Arc::new(SqliteBackend::new(&config.database_path)?)
        }
    };
    Ok(backend)
}

//! Storage traits and error types
//!
//! This module defines the capability interface shared by the persistence
//! backends and the associated error types.

use thiserror::Error;

/// Errors that can occur during storage operations
///
/// A missing key is never an error; lookups report absence through their
/// return value.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Lock poisoned: {0}")]
    Poisoned(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence backend for fetched content, redirects and failing URLs
///
/// Implementations are shared between concurrently running traversals, so
/// every method takes `&self` and synchronizes internally.
pub trait Backend: Send + Sync {
    // ===== Content Cache =====

    /// Stores the payload fetched for `key`
    fn save_content(&self, key: &str, bytes: &[u8]) -> StorageResult<()>;

    /// Loads a previously stored payload
    ///
    /// # Returns
    ///
    /// * `Ok(Some(bytes))` - Cache hit
    /// * `Ok(None)` - Nothing stored for this key
    fn load_content(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    // ===== Redirect Map =====

    /// Records that `from_url` resolved to `to_url`
    ///
    /// Does nothing when both URLs are equal.
    fn add_redirect(&self, from_url: &str, to_url: &str) -> StorageResult<()>;

    /// Resolves a URL through the redirect map
    ///
    /// Returns the input unchanged when no redirect is recorded.
    fn get_redirect(&self, url: &str) -> StorageResult<String>;

    // ===== Error Set =====

    /// Marks a URL as failing; adding the same URL twice is a no-op
    fn add_error(&self, url: &str) -> StorageResult<()>;

    /// Returns true if the URL failed in this or an earlier run
    fn is_error(&self, url: &str) -> StorageResult<bool>;
}

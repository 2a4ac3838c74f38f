//! Seedcrawl: a same-site document harvester
//!
//! This crate crawls a list of seed URLs, follows same-site links up to a
//! depth and link budget, and returns the raw HTML and PDF payloads it finds.
//! Fetched payloads, redirect resolutions and failing URLs are persisted so
//! repeated runs avoid redundant network traffic.

pub mod config;
pub mod crawler;
pub mod document;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl_urls, BatchSummary, CrawlBatch, Coordinator};
pub use document::{CrawlResult, Document};
pub use storage::{Backend, FilesystemBackend, SqliteBackend};
pub use url::{canonicalize, ensure_scheme, is_filtered};

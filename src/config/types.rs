use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure for seedcrawl
///
/// Every section is optional in the TOML file; missing values fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Seed URLs to crawl, in order
    pub seeds: Vec<String>,
    pub crawler: CrawlerConfig,
    pub storage: StorageConfig,
    pub results: ResultsConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Depth ceiling per seed; 0 fetches nothing, 1 fetches only the seed
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of URLs visited per seed, unlimited when absent
    #[serde(rename = "max-links", skip_serializing_if = "Option::is_none")]
    pub max_links: Option<usize>,

    /// HTTP request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Number of seeds crawled at the same time
    pub concurrency: usize,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Log every fetch and filter decision
    pub verbose: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            max_links: None,
            request_timeout: 30,
            concurrency: 1,
            user_agent: format!("seedcrawl/{}", env!("CARGO_PKG_VERSION")),
            verbose: false,
        }
    }
}

/// Which persistence backend holds the content cache, redirects and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Filesystem,
    #[serde(alias = "database")]
    Sqlite,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filesystem => "filesystem",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filesystem" | "fs" => Ok(Self::Filesystem),
            "sqlite" | "database" | "db" => Ok(Self::Sqlite),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Persistence backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: BackendKind,

    /// Base directory of the filesystem backend
    pub path: PathBuf,

    /// SQLite file of the database backend
    #[serde(rename = "database-path")]
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Filesystem,
            path: PathBuf::from("./.crawler"),
            database_path: PathBuf::from("./.crawler/crawler.db"),
        }
    }
}

/// Per-seed result handling
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResultsConfig {
    /// Reuse whole per-seed results from the result cache
    #[serde(rename = "cache-enabled")]
    pub cache_enabled: bool,

    #[serde(rename = "cache-path")]
    pub cache_path: PathBuf,

    /// Keep every seed's result in the returned batch
    pub append: bool,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            cache_enabled: false,
            cache_path: PathBuf::from("./html_cache.db"),
            append: true,
        }
    }
}

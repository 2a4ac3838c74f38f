//! Configuration module for seedcrawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use seedcrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BackendKind, Config, CrawlerConfig, ResultsConfig, StorageConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, load_config, parse_config, ENV_BACKEND, ENV_PATH, ENV_VERBOSE,
};
pub use validation::{validate, validate_seed, validate_seeds, MAX_CONCURRENCY};

use crate::config::types::{Config, CrawlerConfig, ResultsConfig, StorageConfig};
use crate::url::ensure_scheme;
use crate::ConfigError;
use url::Url;

/// Upper bound for `crawler.concurrency`
pub const MAX_CONCURRENCY: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    validate_results_config(&config.results)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "request-timeout must be at least 1 second".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates storage paths
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "storage path cannot be empty".to_string(),
        ));
    }

    if config.database_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_results_config(config: &ResultsConfig) -> Result<(), ConfigError> {
    if config.cache_enabled && config.cache_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "cache-path cannot be empty when cache-enabled is set".to_string(),
        ));
    }
    Ok(())
}

/// Validates seed URLs
///
/// Seeds may omit the scheme; they are checked after `http://` is added.
pub fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        validate_seed(seed)?;
    }
    Ok(())
}

/// Validates a single seed URL
pub fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    if seed.trim().is_empty() {
        return Err(ConfigError::InvalidSeed("seed cannot be empty".to_string()));
    }

    let url = Url::parse(&ensure_scheme(seed))
        .map_err(|e| ConfigError::InvalidSeed(format!("'{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidSeed(format!(
            "'{}' must use http or https",
            seed
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidSeed(format!("'{}' has no host", seed)));
    }

    Ok(())
}

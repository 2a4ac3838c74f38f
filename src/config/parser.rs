use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Overrides the filesystem backend's base directory
pub const ENV_PATH: &str = "CRAWLER_PATH";
/// Overrides the backend selection
pub const ENV_BACKEND: &str = "CRAWLER_BACKEND";
/// Overrides verbose logging
pub const ENV_VERBOSE: &str = "CRAWLER_VERBOSE";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied after parsing and before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use seedcrawl::config::load_config;
///
/// let config = load_config(Path::new("crawler.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Parses configuration text, applying overrides from `lookup`
pub fn parse_config<F>(content: &str, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config = toml::from_str(content)?;
    apply_env_overrides(&mut config, lookup)?;
    validate(&config)?;
    Ok(config)
}

/// Applies `CRAWLER_*` overrides
///
/// `lookup` stands in for `std::env::var` so callers can inject values.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(ENV_PATH).filter(|v| !v.trim().is_empty()) {
        config.storage.path = path.trim().into();
    }

    if let Some(backend) = lookup(ENV_BACKEND).filter(|v| !v.trim().is_empty()) {
        config.storage.backend = backend
            .parse()
            .map_err(|e| ConfigError::Validation(format!("{}: {}", ENV_BACKEND, e)))?;
    }

    if let Some(verbose) = lookup(ENV_VERBOSE) {
        config.crawler.verbose = parse_flag(&verbose).ok_or_else(|| {
            ConfigError::Validation(format!(
                "{} must be a boolean flag, got '{}'",
                ENV_VERBOSE, verbose
            ))
        })?;
    }

    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

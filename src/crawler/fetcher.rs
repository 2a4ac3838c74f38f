//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - Skipping URLs recorded as failing
//! - Serving payloads from the content cache
//! - Recording redirects, failures and fresh payloads in the backend

use crate::config::CrawlerConfig;
use crate::storage::{Backend, StorageResult};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a download failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, TLS, timeout or body read failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a status of 400 or above
    #[error("HTTP status {0}")]
    Status(u16),
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Payload bytes, from the cache or the network
    Content(Vec<u8>),

    /// URL is in the error set; no request was made
    Skipped,

    /// The download failed and the URL was added to the error set
    Error(FetchError),
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed with reqwest's default policy; the final URL is
/// read back from the response.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use seedcrawl::config::CrawlerConfig;
/// use seedcrawl::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.request_timeout);

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Downloads URLs through the persistence backend's caches
pub struct Fetcher {
    client: Client,
    backend: Arc<dyn Backend>,
}

impl Fetcher {
    pub fn new(client: Client, backend: Arc<dyn Backend>) -> Self {
        Self { client, backend }
    }

    /// Builds the HTTP client from the crawler configuration
    pub fn from_config(
        config: &CrawlerConfig,
        backend: Arc<dyn Backend>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?, backend))
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Returns the payload of `url`
    ///
    /// # Request Flow
    ///
    /// 1. URL in the error set → `Skipped`, no request
    /// 2. Non-empty payload in the content cache → `Content`, no request
    /// 3. One GET request, following redirects
    ///    - transport failure or status >= 400 → URL added to the error
    ///      set, `Error`
    ///    - success → redirect and payload recorded, `Content`
    ///
    /// # Returns
    ///
    /// * `Ok(FetchOutcome)` - Every network outcome, including failures
    /// * `Err(StorageError)` - The backend could not be read or written
    pub async fn fetch(&self, url: &str) -> StorageResult<FetchOutcome> {
        if self.backend.is_error(url)? {
            tracing::debug!("Skipping known-bad URL {}", url);
            return Ok(FetchOutcome::Skipped);
        }

        // An empty cached payload counts as a miss
        if let Some(cached) = self.backend.load_content(url)?.filter(|b| !b.is_empty()) {
            tracing::debug!("Cached {}", url);
            return Ok(FetchOutcome::Content(cached));
        }

        tracing::debug!("Downloading {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Request to {} failed: {}", url, e);
                self.backend.add_error(url)?;
                return Ok(FetchOutcome::Error(FetchError::Transport(e.to_string())));
            }
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            tracing::warn!("{} returned HTTP {}", url, status.as_u16());
            self.backend.add_error(url)?;
            return Ok(FetchOutcome::Error(FetchError::Status(status.as_u16())));
        }

        let final_url = response.url().to_string();

        let body = match response.bytes().await {
            Ok(body) => body.to_vec(),
            Err(e) => {
                tracing::warn!("Reading body of {} failed: {}", url, e);
                self.backend.add_error(url)?;
                return Ok(FetchOutcome::Error(FetchError::Transport(e.to_string())));
            }
        };

        if final_url != url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }
        self.backend.add_redirect(url, &final_url)?;
        self.backend.save_content(url, &body)?;

        Ok(FetchOutcome::Content(body))
    }
}

//! Crawler coordinator - main crawl orchestration logic
//!
//! This module runs a batch of seeds through the traversal, including:
//! - Opening the persistence backend and the optional result cache
//! - Inferring missing URL schemes on seeds
//! - Serving whole per-seed results from the result cache
//! - Isolating failures so one broken seed never aborts the batch
//! - Keeping or discarding results according to the `append` setting

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::traversal::{traverse, TraversalLimits};
use crate::document::CrawlResult;
use crate::storage::{open_backend, Backend, ResultCache};
use crate::url::ensure_scheme;
use crate::CrawlError;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;

/// Counters for one batch of seeds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Seeds processed
    pub seeds: usize,
    /// Seeds whose crawl failed and produced an empty result
    pub failed: usize,
    /// Seeds served from the result cache
    pub cached: usize,
    /// Documents across all seeds
    pub documents: usize,
}

/// Results of a batch, in input seed order
///
/// `results` is empty when `results.append` is off.
#[derive(Debug, Clone, Default)]
pub struct CrawlBatch {
    pub results: Vec<CrawlResult>,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeedStatus {
    Crawled,
    Cached,
    Failed,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Fetcher,
    result_cache: Option<ResultCache>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Backend and result cache opened
    /// * `Err(CrawlError)` - Failed to initialize
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let backend = open_backend(&config.storage)?;
        Self::with_backend(config, backend)
    }

    /// Creates a coordinator over an already opened backend
    pub fn with_backend(config: Config, backend: Arc<dyn Backend>) -> Result<Self, CrawlError> {
        let fetcher = Fetcher::from_config(&config.crawler, backend)?;

        let result_cache = if config.results.cache_enabled {
            tracing::debug!(
                "Using result cache at {}",
                config.results.cache_path.display()
            );
            Some(ResultCache::open(&config.results.cache_path)?)
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            result_cache,
        })
    }

    /// Replaces the result cache, enabling it if it was off
    pub fn with_result_cache(mut self, cache: ResultCache) -> Self {
        self.result_cache = Some(cache);
        self
    }

    /// Crawls a single seed
    ///
    /// A seed without scheme gets `http://`. When the result cache holds the
    /// seed, the stored result is returned as-is and depth and link limits
    /// do not apply.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Documents of the seed, possibly none
    /// * `Err(CrawlError)` - The backend or the result cache failed
    pub async fn crawl_seed(&self, seed: &str) -> Result<CrawlResult, CrawlError> {
        let seed = ensure_scheme(seed);
        self.crawl_prepared(&seed).await.map(|(result, _)| result)
    }

    async fn crawl_prepared(&self, seed: &str) -> Result<(CrawlResult, SeedStatus), CrawlError> {
        if let Some(cache) = &self.result_cache {
            if let Some(result) = cache.get(seed)? {
                tracing::debug!("Result for {} served from cache", seed);
                return Ok((result, SeedStatus::Cached));
            }
        }

        let limits = TraversalLimits::from(&self.config.crawler);
        let result = traverse(&self.fetcher, seed, limits).await?;

        if let Some(cache) = &self.result_cache {
            cache.put(&result)?;
        }

        Ok((result, SeedStatus::Crawled))
    }

    async fn process_seed(
        &self,
        index: usize,
        total: usize,
        seed: &str,
    ) -> (usize, CrawlResult, SeedStatus) {
        let seed = ensure_scheme(seed);
        tracing::info!("Crawling seed {}/{}: {}", index + 1, total, seed);

        match self.crawl_prepared(&seed).await {
            Ok((result, status)) => {
                tracing::debug!(
                    "Seed {} finished with {} documents",
                    seed,
                    result.documents.len()
                );
                (index, result, status)
            }
            Err(e) => {
                tracing::error!("Crawling seed {} failed: {}", seed, e);
                (index, CrawlResult::empty(seed), SeedStatus::Failed)
            }
        }
    }

    /// Crawls every seed, handing each result to `on_result` in input order
    ///
    /// Up to `crawler.concurrency` seeds are in flight at once. A failing
    /// seed is logged and reported as an empty result; the batch continues.
    pub async fn crawl_each<S, F>(&self, seeds: &[S], mut on_result: F) -> BatchSummary
    where
        S: AsRef<str>,
        F: FnMut(usize, CrawlResult),
    {
        let total = seeds.len();
        let start_time = Instant::now();
        let mut summary = BatchSummary::default();

        let mut results = stream::iter(seeds.iter().enumerate())
            .map(|(index, seed)| self.process_seed(index, total, seed.as_ref()))
            .buffered(self.config.crawler.concurrency.max(1));

        while let Some((index, result, status)) = results.next().await {
            summary.seeds += 1;
            summary.documents += result.documents.len();
            match status {
                SeedStatus::Crawled => {}
                SeedStatus::Cached => summary.cached += 1,
                SeedStatus::Failed => summary.failed += 1,
            }
            on_result(index, result);
        }

        tracing::info!(
            "Crawl completed: {} seeds ({} failed, {} cached), {} documents in {:?}",
            summary.seeds,
            summary.failed,
            summary.cached,
            summary.documents,
            start_time.elapsed()
        );

        summary
    }

    /// Crawls every seed and collects the batch
    ///
    /// Results are kept only when `results.append` is on; otherwise only the
    /// summary is returned.
    pub async fn run<S: AsRef<str>>(&self, seeds: &[S]) -> CrawlBatch {
        let append = self.config.results.append;
        let mut kept = Vec::new();

        let summary = self
            .crawl_each(seeds, |_, result| {
                if append {
                    kept.push(result);
                }
            })
            .await;

        CrawlBatch {
            results: kept,
            summary,
        }
    }
}

/// Crawls a list of seeds with the given configuration
///
/// # Example
///
/// ```no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// use seedcrawl::{crawl_urls, Config};
///
/// let batch = crawl_urls(Config::default(), &["example.com"]).await?;
/// println!("{} documents", batch.summary.documents);
/// # Ok(())
/// # }
/// ```
pub async fn crawl_urls<S: AsRef<str>>(config: Config, seeds: &[S]) -> Result<CrawlBatch, CrawlError> {
    let coordinator = Coordinator::new(config)?;
    Ok(coordinator.run(seeds).await)
}

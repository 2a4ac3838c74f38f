//! Depth-first traversal of one seed's link graph
//!
//! The traversal keeps an explicit stack of `(url, depth)` frames instead of
//! recursing. Children are pushed in reverse so that popping yields the same
//! depth-first pre-order a recursive walk would produce, and links are
//! filtered when their frame is popped, so a URL reached through an earlier
//! sibling's subtree is skipped.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::parser::extract_links_from_bytes;
use crate::document::{is_pdf, CrawlResult, Document};
use crate::url::{canonicalize, filter_reason};
use crate::CrawlError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// Depth and link ceilings of a traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalLimits {
    /// 0 fetches nothing, 1 only the seed, 2 the seed and its links, ...
    pub max_depth: u32,

    /// Maximum number of URLs visited for the seed
    pub max_links: Option<usize>,
}

impl TraversalLimits {
    pub fn new(max_depth: u32, max_links: Option<usize>) -> Self {
        Self {
            max_depth,
            max_links,
        }
    }
}

impl From<&CrawlerConfig> for TraversalLimits {
    fn from(config: &CrawlerConfig) -> Self {
        Self::new(config.max_depth, config.max_links)
    }
}

/// Per-seed link counter
///
/// A slot is taken with a single compare-and-increment, so the limit holds
/// even if several tasks draw from the same budget.
#[derive(Debug)]
pub struct LinkBudget {
    limit: Option<usize>,
    used: AtomicUsize,
}

impl LinkBudget {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
        }
    }

    /// Takes one slot; returns false once the limit is reached
    pub fn try_acquire(&self) -> bool {
        match self.limit {
            None => {
                self.used.fetch_add(1, Ordering::AcqRel);
                true
            }
            Some(limit) => self
                .used
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                    (used < limit).then_some(used + 1)
                })
                .is_ok(),
        }
    }

    /// Number of slots taken so far
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    pub fn is_exhausted(&self) -> bool {
        self.limit.map_or(false, |limit| self.used() >= limit)
    }
}

/// State owned by exactly one seed's traversal
#[derive(Debug)]
pub struct TraversalContext {
    seed: String,
    visited: HashSet<String>,
    budget: LinkBudget,
}

impl TraversalContext {
    pub fn new(seed: impl Into<String>, max_links: Option<usize>) -> Self {
        Self {
            seed: seed.into(),
            visited: HashSet::new(),
            budget: LinkBudget::new(max_links),
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Canonical URLs visited so far
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    pub fn budget(&self) -> &LinkBudget {
        &self.budget
    }
}

struct Frame {
    url: String,
    depth: u32,
    is_seed: bool,
}

/// Crawls one seed and returns its documents in depth-first pre-order
///
/// # Arguments
///
/// * `fetcher` - Fetcher bound to the shared backend
/// * `seed` - Seed URL, with scheme
/// * `limits` - Depth and link ceilings
///
/// # Returns
///
/// * `Ok(CrawlResult)` - All documents reached; failed branches are simply absent
/// * `Err(CrawlError)` - The backend failed
pub async fn traverse(
    fetcher: &Fetcher,
    seed: &str,
    limits: TraversalLimits,
) -> Result<CrawlResult, CrawlError> {
    let mut ctx = TraversalContext::new(seed, limits.max_links);
    let documents = walk(fetcher, &mut ctx, limits.max_depth).await?;

    tracing::debug!(
        "Traversal of {} visited {} URLs, kept {} documents",
        seed,
        ctx.visited.len(),
        documents.len()
    );

    Ok(CrawlResult {
        seed: seed.to_string(),
        documents,
    })
}

async fn walk(
    fetcher: &Fetcher,
    ctx: &mut TraversalContext,
    max_depth: u32,
) -> Result<Vec<Document>, CrawlError> {
    let mut documents = Vec::new();
    let mut stack = vec![Frame {
        url: ctx.seed.clone(),
        depth: max_depth,
        is_seed: true,
    }];

    while let Some(frame) = stack.pop() {
        if !frame.is_seed {
            if let Some(reason) = filter_reason(&ctx.seed, &frame.url, &ctx.visited) {
                tracing::debug!("Filtered out {} ({:?})", frame.url, reason);
                continue;
            }
        }

        if frame.depth == 0 {
            continue;
        }

        if !ctx.budget.try_acquire() {
            tracing::debug!("Link budget for {} exhausted", ctx.seed);
            break;
        }

        let url = canonicalize(&frame.url);
        ctx.visited.insert(url.clone());

        let body = match fetcher.fetch(&url).await? {
            FetchOutcome::Content(body) => body,
            FetchOutcome::Skipped | FetchOutcome::Error(_) => continue,
        };

        // PDFs are leaves; depth 1 pages would only produce depth 0 children
        if !is_pdf(&body) && frame.depth > 1 {
            let base = fetcher.backend().get_redirect(&url)?;
            match Url::parse(&base) {
                Ok(base_url) => {
                    let links = extract_links_from_bytes(&base_url, &body);
                    tracing::debug!("Found {} links on {}", links.len(), base);
                    stack.extend(links.iter().rev().map(|link| Frame {
                        url: canonicalize(link),
                        depth: frame.depth - 1,
                        is_seed: false,
                    }));
                }
                Err(e) => tracing::warn!("Cannot resolve links against {}: {}", base, e),
            }
        }

        documents.push(Document::new(url, body));
    }

    Ok(documents)
}

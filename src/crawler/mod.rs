//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching through the backend's content, redirect and error caches
//! - HTML parsing and link extraction
//! - Depth-first traversal of a seed's same-site link graph
//! - Overall crawl coordination across seeds

mod coordinator;
mod fetcher;
mod parser;
mod traversal;

pub use coordinator::{crawl_urls, BatchSummary, Coordinator, CrawlBatch};
pub use fetcher::{build_http_client, FetchError, FetchOutcome, Fetcher};
pub use parser::{extract_links, extract_links_from_bytes, meta_refresh_target};
pub use traversal::{traverse, LinkBudget, TraversalContext, TraversalLimits};

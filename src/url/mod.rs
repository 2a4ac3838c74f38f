//! URL handling module
//!
//! This module provides URL canonicalization, scheme inference, registrable
//! domain extraction and the link filter that decides which discovered URLs
//! a traversal may follow.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::registrable_domain;
pub use filter::{filter_reason, is_filtered, FilterReason};
pub use normalize::{canonicalize, ensure_scheme};

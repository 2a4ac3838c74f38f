//! Fetched documents and per-seed crawl results
//!
//! The crawler never interprets payloads beyond two questions: is this a PDF,
//! and what text does it decode to for link extraction. Everything else is
//! left to downstream consumers.

use std::borrow::Cow;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Returns true when the payload starts with the PDF magic number
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// Decodes a payload as UTF-8, falling back to Latin-1 when that fails
///
/// Latin-1 maps every byte to a code point, so this never fails.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}

/// A single fetched payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Canonical URL the payload was fetched from
    pub url: String,

    /// Raw response body (HTML or PDF bytes)
    pub body: Vec<u8>,
}

impl Document {
    pub fn new(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            body,
        }
    }

    /// Returns true if the payload is a PDF
    pub fn is_pdf(&self) -> bool {
        is_pdf(&self.body)
    }

    /// Size of the payload in bytes
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// All documents collected for one seed, in depth-first pre-order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    /// The seed URL (after scheme inference)
    pub seed: String,

    /// Documents in discovery order, the seed's own payload first
    pub documents: Vec<Document>,
}

impl CrawlResult {
    /// An empty result, used for unreachable or failed seeds
    pub fn empty(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            documents: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Total payload size across all documents
    pub fn total_bytes(&self) -> usize {
        self.documents.iter().map(Document::len).sum()
    }

    /// Iterates over the raw payloads
    pub fn payloads(&self) -> impl Iterator<Item = &[u8]> {
        self.documents.iter().map(|d| d.body.as_slice())
    }
}

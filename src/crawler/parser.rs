//! HTML parser for extracting links
//!
//! This module parses fetched HTML and collects every link the crawler may
//! follow:
//! - `<a href="...">`
//! - `<frame src="...">`
//! - `<csaction val0="...">`, a custom element some sites use as a link carrier
//! - `<meta content="...; url=...">`, i.e. meta refresh targets
//!
//! Links are resolved against the page's final URL but not filtered here;
//! scheme, domain and extension rules are applied by the traversal.

use crate::document::decode_text;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Element selectors paired with the attribute holding the link
const LINK_SOURCES: &[(&str, &str)] = &[
    ("a[href]", "href"),
    ("frame[src]", "src"),
    ("csaction[val0]", "val0"),
];

/// Extracts all links from an HTML document
///
/// # Arguments
///
/// * `base_url` - Final URL of the page, used to resolve relative links
/// * `html` - The HTML content
///
/// # Returns
///
/// Absolute URLs in document order per source (anchors, frames, csaction
/// elements, meta refresh), without duplicates. Empty and unresolvable
/// values are skipped.
///
/// # Example
///
/// ```
/// use seedcrawl::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_links(&base_url, html), vec!["https://example.com/page"]);
/// ```
pub fn extract_links(base_url: &Url, html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let mut push = |raw: &str| {
        if let Some(absolute_url) = resolve_link(raw, base_url) {
            if seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    };

    for (selector, attr) in LINK_SOURCES {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attr) {
                push(value);
            }
        }
    }

    if let Ok(meta_selector) = Selector::parse("meta[content]") {
        for element in document.select(&meta_selector) {
            if let Some(target) = element.value().attr("content").and_then(meta_refresh_target) {
                push(target);
            }
        }
    }

    links
}

/// Extracts links from a raw payload
///
/// The bytes are decoded as UTF-8, falling back to Latin-1.
pub fn extract_links_from_bytes(base_url: &Url, body: &[u8]) -> Vec<String> {
    extract_links(base_url, &decode_text(body))
}

/// Returns the `url` value of a `key=value;key=value` meta content string
///
/// Keys are trimmed and compared case-insensitively; the value may itself
/// contain `=` and may be wrapped in single or double quotes.
pub fn meta_refresh_target(content: &str) -> Option<&str> {
    content.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("url") {
            Some(strip_quotes(value.trim()))
        } else {
            None
        }
    })
}

fn strip_quotes(value: &str) -> &str {
    ['\'', '"']
        .iter()
        .find_map(|&quote| value.strip_prefix(quote)?.strip_suffix(quote))
        .map(str::trim)
        .unwrap_or(value)
}

/// Resolves a link against the base URL
///
/// Returns None for empty values and values that cannot be joined.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    base_url.join(href).ok().map(|url| url.to_string())
}

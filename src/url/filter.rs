//! Link filter deciding which discovered URLs a traversal follows

use crate::url::domain::registrable_domain;
use std::collections::HashSet;
use url::Url;

/// Suffixes that mark a URL as an image, never worth fetching
const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

/// File extensions that are treated as pages (or PDFs) and may be followed
const PAGE_EXTENSIONS: &[&str] = &[
    "html", "htm", "shtm", "shtml", "php", "jsp", "aspx", "asp", "pdf",
];

/// Why a candidate URL was excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterReason {
    /// The candidate is a `mailto:` link
    Mailto,
    /// The seed or the candidate is not an http(s) URL
    UnsupportedScheme,
    /// The candidate points at an image
    Image,
    /// The candidate was already visited during this traversal
    AlreadyVisited,
    /// The candidate lives on a different registrable domain than the seed
    ExternalDomain,
    /// The candidate's file extension is not a page or PDF extension
    DisallowedExtension,
}

/// Returns true if the candidate must not be followed from this seed
///
/// `visited` is the visited set of the current traversal. See
/// [`filter_reason`] for the individual rules.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use seedcrawl::url::is_filtered;
///
/// let visited = HashSet::new();
/// assert!(is_filtered("http://host/", "http://host2/index.html", &visited));
/// assert!(!is_filtered("http://host/", "http://host/folder/another-folder", &visited));
/// ```
pub fn is_filtered(seed: &str, candidate: &str, visited: &HashSet<String>) -> bool {
    filter_reason(seed, candidate, visited).is_some()
}

/// Returns the first rule that excludes the candidate, or `None` if it may be followed
///
/// # Rules
///
/// | Rule | Excluded when |
/// |------|---------------|
/// | Mailto | candidate starts with `mailto:` |
/// | UnsupportedScheme | seed or candidate is not an http/https URL |
/// | Image | candidate ends in `.jpg/.jpeg/.png/.gif` (path or full URL, any case) |
/// | AlreadyVisited | candidate is in `visited` |
/// | ExternalDomain | registrable domains of seed and candidate differ |
/// | DisallowedExtension | filename has a dot and the suffix is not a page/PDF extension |
///
/// Filenames without any dot are assumed to be server-routed pages and pass.
pub fn filter_reason(
    seed: &str,
    candidate: &str,
    visited: &HashSet<String>,
) -> Option<FilterReason> {
    if candidate.starts_with("mailto:") {
        return Some(FilterReason::Mailto);
    }

    let (seed_url, candidate_url) = match (parse_http(seed), parse_http(candidate)) {
        (Some(seed_url), Some(candidate_url)) => (seed_url, candidate_url),
        _ => return Some(FilterReason::UnsupportedScheme),
    };

    if is_image(candidate) || is_image(candidate_url.path()) {
        return Some(FilterReason::Image);
    }

    if visited.contains(candidate) {
        return Some(FilterReason::AlreadyVisited);
    }

    if registrable_domain(&seed_url) != registrable_domain(&candidate_url) {
        return Some(FilterReason::ExternalDomain);
    }

    let filename = candidate_url.path().rsplit('/').next().unwrap_or("");
    if let Some((_, extension)) = filename.rsplit_once('.') {
        let extension = extension.to_ascii_lowercase();
        if !PAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Some(FilterReason::DisallowedExtension);
        }
    }

    None
}

fn parse_http(url: &str) -> Option<Url> {
    Url::parse(url)
        .ok()
        .filter(|parsed| matches!(parsed.scheme(), "http" | "https"))
}

fn is_image(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    IMAGE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

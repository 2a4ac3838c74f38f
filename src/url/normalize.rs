use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Canonicalizes a URL string for deduplication and cache keys
///
/// # Canonicalization Steps
///
/// 1. Remove the fragment (everything from the first `#`)
/// 2. If a `scheme://authority` URL has an empty path, insert `/` after the
///    authority (before any query string)
/// 3. Percent-decode, interpreting the bytes as UTF-8 and falling back to
///    Latin-1 when they are not valid UTF-8
///
/// The steps are repeated until the string no longer changes, so the result
/// is a fixed point: canonicalizing it again returns it unchanged. This never
/// fails; strings that are not URLs at all pass through the same steps.
///
/// # Examples
///
/// ```
/// use seedcrawl::url::canonicalize;
///
/// assert_eq!(canonicalize("http://example.com#top"), "http://example.com/");
/// assert_eq!(canonicalize("http://example.com/caf%C3%A9"), "http://example.com/café");
/// ```
pub fn canonicalize(url: &str) -> String {
    // Every pass that changes the string shortens it, apart from the
    // root-path insertion, so this terminates
    let mut current = canonicalize_once(url);
    loop {
        let next = canonicalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Prefixes `http://` when the URL has no scheme
///
/// Only seed URLs go through this; discovered links are always resolved
/// against an absolute base.
///
/// # Examples
///
/// ```
/// use seedcrawl::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("example.com"), "http://example.com");
/// assert_eq!(ensure_scheme("https://example.com/"), "https://example.com/");
/// ```
pub fn ensure_scheme(url: &str) -> String {
    let url = url.trim();
    if has_scheme(url) {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

fn canonicalize_once(url: &str) -> String {
    let without_fragment = match url.find('#') {
        Some(index) => &url[..index],
        None => url,
    };

    let with_path = ensure_root_path(without_fragment);
    decode(&with_path)
}

/// Inserts the root path into `scheme://authority[?query]` URLs
fn ensure_root_path(url: &str) -> Cow<'_, str> {
    let authority_start = match url.find("://") {
        Some(index) if is_scheme(&url[..index]) => index + 3,
        _ => return Cow::Borrowed(url),
    };

    let rest = &url[authority_start..];
    match rest.find(|c: char| c == '/' || c == '?') {
        Some(offset) if rest[offset..].starts_with('/') => Cow::Borrowed(url),
        Some(offset) => {
            let (head, query) = url.split_at(authority_start + offset);
            Cow::Owned(format!("{}/{}", head, query))
        }
        None => Cow::Owned(format!("{}/", url)),
    }
}

fn decode(url: &str) -> String {
    match percent_decode_str(url).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => percent_decode_str(url).map(|b| b as char).collect(),
    }
}

/// Returns true if the string starts with `scheme:`
///
/// `host:8080` style inputs are not treated as having a scheme.
fn has_scheme(url: &str) -> bool {
    match url.split_once(':') {
        Some((scheme, rest)) => {
            is_scheme(scheme) && !rest.starts_with(|c: char| c.is_ascii_digit())
        }
        None => false,
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

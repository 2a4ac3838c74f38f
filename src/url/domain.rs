use url::Url;

/// Extracts the registrable domain from a URL
///
/// The registrable domain is approximated by the last two dot-separated
/// labels of the host, which is what same-site filtering compares. Ports are
/// not part of the host and are ignored.
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// * `Some(String)` - The lowercase registrable domain
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use seedcrawl::url::registrable_domain;
///
/// let url = Url::parse("https://blog.example.com/path").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.com".to_string()));
/// ```
pub fn registrable_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    let labels: Vec<&str> = host.split('.').collect();
    let start = labels.len().saturating_sub(2);
    Some(labels[start..].join("."))
}

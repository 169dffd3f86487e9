use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use canton_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs point at the same host and explicit port
///
/// The scheme is not compared, so an `http` page linking to its `https`
/// counterpart stays on the same site.
pub fn same_host(a: &Url, b: &Url) -> bool {
    extract_domain(a) == extract_domain(b) && a.port() == b.port()
}

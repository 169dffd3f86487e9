use url::Url;

/// Resolves a link href against the page it was found on
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only anchors
/// - `javascript:`, `mailto:`, `tel:` and `data:` targets
/// - hrefs that fail to resolve
/// - anything that is not HTTP(S) after resolution
///
/// The resolved URL is returned exactly as the `url` crate serializes it;
/// that string is the URL's identity in the visited set.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}

/// Resolves a section path from the sections file against the base URL
pub fn resolve_section(base_url: &Url, section: &str) -> Result<Url, url::ParseError> {
    base_url.join(section)
}

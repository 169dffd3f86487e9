//! HTML parser for extracting links to follow
//!
//! Every `<a href>` on a page is a candidate. Hrefs are resolved against the
//! page URL and filtered through `url::resolve_link`; the result keeps
//! document order and may contain duplicates, which the frontier drops.

use crate::url::resolve_link;
use scraper::{Html, Selector};
use url::Url;

/// Extracts every followable link from `html`
///
/// # Example
///
/// ```
/// use canton_crawler::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &page_url);
/// assert_eq!(links[0].as_str(), "https://example.com/page");
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    collect_links(&document, page_url)
}

fn collect_links(document: &Html, page_url: &Url) -> Vec<Url> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, page_url))
        .collect()
}

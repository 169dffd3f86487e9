use url::Url;

/// Returns the file extension of the URL's last path segment
///
/// The extension is returned without its dot. Query strings and fragments
/// never contribute to it, and a trailing dot or a dot-file name (`.htaccess`)
/// yields no extension.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use canton_crawler::url::path_extension;
///
/// let url = Url::parse("https://example.com/docs/acta.PDF?v=2").unwrap();
/// assert_eq!(path_extension(&url), Some("PDF".to_string()));
/// ```
pub fn path_extension(url: &Url) -> Option<String> {
    let file_name = url.path_segments()?.last()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_string())
}

/// Returns true if the URL's extension is one of `document_extensions`
///
/// The comparison is case-insensitive.
pub fn is_document(url: &Url, document_extensions: &[String]) -> bool {
    match path_extension(url) {
        Some(ext) => document_extensions
            .iter()
            .any(|doc| doc.eq_ignore_ascii_case(&ext)),
        None => false,
    }
}

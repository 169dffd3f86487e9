use std::path::Path;

/// Reads the initial section paths listed in `path`
///
/// Each non-empty line is one path relative to the crawl's base URL.
/// Surrounding whitespace is trimmed, blank lines are ignored and the order
/// of the file is preserved.
pub fn load_sections(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

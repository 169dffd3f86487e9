//! Content extraction from saved HTML pages
//!
//! This module turns raw HTML into clean text, including:
//! - Locating the main content region through a prioritized fallback chain
//! - Stripping boilerplate without mutating the parsed document
//! - Title and date lookup
//! - A simpler whole-document variant for plain link-following
//! - Loading files with an explicit encoding

mod plain;
mod region;
mod text;

pub use plain::extract_plain_text;
pub use region::find_target_region;
pub use text::{block_text, normalize_text};

use encoding_rs::{Encoding, UTF_8};
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a page for extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown encoding label: {0}")]
    UnknownEncoding(String),
}

/// Which region heuristic produced an extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fallback {
    Contenido,
    NewsBody,
    NovedadesMensaje,
    Largest,

    /// The file could not be processed
    Error,
}

impl Fallback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contenido => "contenido",
            Self::NewsBody => "news-body",
            Self::NovedadesMensaje => "novedadespop_mensaje",
            Self::Largest => "largest",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text and metadata extracted from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub title: Option<String>,
    pub date: Option<String>,
    pub text: String,
    pub fallback: Fallback,
}

impl ExtractionResult {
    /// Placeholder recorded for a file that failed to process
    pub fn error() -> Self {
        Self {
            title: None,
            date: None,
            text: String::new(),
            fallback: Fallback::Error,
        }
    }
}

/// Extracts the main content of a page
///
/// The region is chosen by `find_target_region`. Inside it, script, style,
/// noscript, header, footer and nav subtrees are ignored. When the region
/// holds tables with `role="presentation"`, only their text is kept, joined
/// in document order; otherwise the whole region is rendered. The title
/// comes from `.novedadespop_titulo` inside the region and the date from
/// `td.novedadespop_fecha` anywhere in the document.
///
/// The function is pure: the same input always yields the same result.
///
/// # Example
///
/// ```
/// use canton_crawler::extract_content;
///
/// let html = r#"<table class="contenido"><tr><td><div class="novedadespop_titulo">T</div><table role="presentation"><tr><td>Hi<br>there</td></tr></table></td></tr></table>"#;
/// let result = extract_content(html);
/// assert_eq!(result.text, "Hi\nthere");
/// assert_eq!(result.title.as_deref(), Some("T"));
/// ```
pub fn extract_content(html: &str) -> ExtractionResult {
    let document = Html::parse_document(html);

    let (region, fallback) = find_target_region(&document);
    let title = find_title(region);
    let text = normalize_text(&region_text(region));
    let date = find_date(&document);

    tracing::debug!("Used region: {}", fallback);
    ExtractionResult {
        title,
        date,
        text,
        fallback,
    }
}

/// Descendants of `region` matching `css`, minus the region itself and
/// anything inside a stripped subtree
fn select_in_region<'a>(region: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };
    let region_id = (*region).id();

    region
        .select(&selector)
        .filter(|el| (**el).id() != region_id)
        .filter(|el| !text::is_stripped_within(*el, region))
        .collect()
}

fn find_title(region: ElementRef<'_>) -> Option<String> {
    select_in_region(region, ".novedadespop_titulo")
        .into_iter()
        .next()
        .map(|el| block_text(el).trim().to_string())
        .filter(|title| !title.is_empty())
}

fn region_text(region: ElementRef<'_>) -> String {
    let tables = select_in_region(region, "table[role='presentation']");
    if tables.is_empty() {
        return block_text(region);
    }

    tables
        .into_iter()
        .map(block_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn find_date(document: &Html) -> Option<String> {
    let selector = Selector::parse("td.novedadespop_fecha").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| normalize_text(&text::plain_text(el)))
}

/// Reads an HTML file with an explicit encoding
///
/// A UTF-8 byte-order mark is removed when the label resolves to UTF-8.
/// Malformed sequences are replaced rather than rejected.
///
/// # Errors
///
/// Returns `ExtractError::UnknownEncoding` for labels encoding_rs does not
/// know and `ExtractError::Io` when the file cannot be read.
pub fn load_html(path: &Path, encoding: &str) -> Result<String, ExtractError> {
    let encoding = Encoding::for_label(encoding.trim().as_bytes())
        .ok_or_else(|| ExtractError::UnknownEncoding(encoding.to_string()))?;

    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let text = if encoding == UTF_8 {
        encoding.decode_with_bom_removal(&bytes).0
    } else {
        encoding.decode_without_bom_handling(&bytes).0
    };
    Ok(text.into_owned())
}

/// Loads and extracts one file, never failing
///
/// Any error is logged and turned into `ExtractionResult::error()` so a
/// batch keeps going.
pub fn process_file(path: &Path, encoding: &str) -> ExtractionResult {
    match load_html(path, encoding) {
        Ok(html) => extract_content(&html),
        Err(e) => {
            tracing::warn!("Failed to process {}: {}", path.display(), e);
            ExtractionResult::error()
        }
    }
}

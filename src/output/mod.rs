//! Output module for crawl summaries and aggregated extraction results
//!
//! This module handles:
//! - Discovering saved pages and extracting them in parallel
//! - Writing the aggregated results as text, markdown or JSON Lines
//! - Recording and printing crawl statistics

mod batch;
pub mod stats;
mod writers;

pub use batch::{discover_files, extract_batch, sort_results};
pub use stats::{print_statistics, CrawlCounters, CrawlStatistics};
pub use writers::{format_document, write_results};

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Unknown output format '{0}' (expected txt, md or jsonl)")]
    UnknownFormat(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Format of the aggregated extraction file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text
    #[default]
    Text,

    /// Lightweight markup with `#` title headings
    Markdown,

    /// One JSON object per line
    JsonLines,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::JsonLines => "jsonl",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" | "plain" => Ok(Self::Text),
            "md" | "markdown" | "markup" => Ok(Self::Markdown),
            "jsonl" | "json" | "structured" => Ok(Self::JsonLines),
            other => Err(OutputError::UnknownFormat(other.to_string())),
        }
    }
}

//! Storage module for persisting crawl output as flat files
//!
//! This module handles everything the crawler writes to disk, including:
//! - The content-addressed document store with per-section naming
//! - SHA-256 hashing of stored content
//! - Per-section extracted text files

mod documents;
mod hashing;
mod texts;

pub use documents::{DocumentStore, StoreOutcome, StoredDocument};
pub use hashing::{find_by_digest, sha256_bytes, sha256_file};
pub use texts::save_section_text;

use crate::FetchError;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid document URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Turns a section label into a single file-name component
///
/// Path separators become underscores and surrounding slashes are dropped.
/// The root section maps to `index`.
pub fn section_file_name(section: &str) -> String {
    let name = section.trim().trim_matches('/').replace(['/', '\\'], "_");
    if name.is_empty() {
        "index".to_string()
    } else {
        name
    }
}

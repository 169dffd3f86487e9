//! URL handling module
//!
//! This module provides link resolution against a page URL, host comparison
//! for single-site crawls, and file-extension detection used to name
//! downloaded documents.

mod domain;
mod extension;
mod resolve;

// Re-export main functions
pub use domain::{extract_domain, same_host};
pub use extension::{is_document, path_extension};
pub use resolve::{resolve_link, resolve_section};

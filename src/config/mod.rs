//! Configuration module for the crawler
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and reading the sections list a crawl is seeded from.
//!
//! # Example
//!
//! ```no_run
//! use canton_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawling {} with {} workers", config.crawler.base_url, config.crawler.max_workers);
//! ```

mod parser;
mod sections;
mod types;
mod validation;

// Re-export types
pub use types::{AuthConfig, Config, CrawlerConfig, FetchConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use sections::load_sections;

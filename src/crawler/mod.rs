//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetch` capability
//! - Exponential-backoff retry
//! - HTML link extraction
//! - The shared frontier of visited URLs and pending work
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod retry;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_once, Fetch, FetchResponse, HttpFetcher};
pub use frontier::{EnqueueOutcome, Frontier, FrontierEntry};
pub use parser::extract_links;
pub use retry::{retry, RetryPolicy};

use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::CantonError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Log in if the configuration asks for it
/// 2. Seed the frontier from the sections file
/// 3. Fetch pages and download documents with a worker pool
/// 4. Extract and follow links until the frontier drains
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl completed successfully
/// * `Err(CantonError)` - Crawl failed
pub async fn crawl(config: Config) -> Result<CrawlStatistics, CantonError> {
    run_crawl(config).await
}

//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The `Fetch` capability the crawler and downloader are written against
//! - Building HTTP clients with a cookie store, user agent and timeouts
//! - Retry of transient failures through the backoff wrapper
//! - Error classification

use crate::config::FetchConfig;
use crate::crawler::retry::{retry, RetryPolicy};
use crate::{CantonError, FetchError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Successful response of a fetch
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, if the server sent one
    pub content_type: Option<String>,

    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Returns true if the body should be parsed as an HTML page
    ///
    /// A missing Content-Type is treated as HTML.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(content_type) => {
                let content_type = content_type.to_ascii_lowercase();
                content_type.contains("text/html") || content_type.contains("application/xhtml")
            }
            None => true,
        }
    }

    /// The body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Capability to fetch a URL
///
/// Implementations fail with a `FetchError` on transport problems and on any
/// non-success status.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// Cookies are kept for the lifetime of the client so a logged-in session
/// carries over to every later request.
///
/// # Example
///
/// ```no_run
/// use canton_crawler::config::FetchConfig;
/// use canton_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Fetch` implementation backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    /// Creates a fetcher with a fresh client built from `config`
    pub fn new(config: &FetchConfig) -> Result<Self, CantonError> {
        let client = build_http_client(config)?;
        let retry = RetryPolicy::new(config.retries, Duration::from_millis(config.base_delay_ms))?;
        Ok(Self::from_client(client, retry))
    }

    /// Wraps an existing client, e.g. one holding a logged-in session
    pub fn from_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        retry(&self.retry, FetchError::is_retryable, || {
            fetch_once(&self.client, url)
        })
        .await
    }
}

/// Performs a single GET request
///
/// Any status outside 2xx is reported as `FetchError::Status`.
pub async fn fetch_once(client: &Client, url: &str) -> Result<FetchResponse, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    Ok(FetchResponse {
        final_url,
        status: status.as_u16(),
        content_type,
        body: body.to_vec(),
    })
}

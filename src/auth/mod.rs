//! Site login
//!
//! Posts the credentials form once per attempt with exponential backoff and
//! hands back the cookie-carrying client as the crawl's fetcher.

mod credentials;

pub use credentials::{load_credentials, Credentials};

use crate::config::{AuthConfig, FetchConfig};
use crate::crawler::{build_http_client, retry, HttpFetcher, RetryPolicy};
use crate::{ConfigError, FetchError};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while logging in
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials file {path}: {reason}")]
    Credentials { path: PathBuf, reason: String },

    #[error("Login to {url} failed after {attempts} attempts: {source}")]
    Failed {
        url: String,
        attempts: u32,
        #[source]
        source: FetchError,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid login settings: {0}")]
    Config(#[from] ConfigError),
}

/// Logs in and returns a fetcher sharing the authenticated session
///
/// Every failed attempt, whether a transport error or a non-success status,
/// is retried according to `policy`.
///
/// # Arguments
///
/// * `credentials` - User and password sent as the `username` and `password` form fields
/// * `login_url` - Endpoint receiving the POST
/// * `fetch` - Client settings; its retry values are used for later page fetches
/// * `policy` - Retry policy for the login POST itself
///
/// # Returns
///
/// * `Ok(HttpFetcher)` - Fetcher whose cookie store holds the session
/// * `Err(AuthError)` - The client could not be built or every attempt failed
pub async fn login(
    credentials: &Credentials,
    login_url: &str,
    fetch: &FetchConfig,
    policy: &RetryPolicy,
) -> Result<HttpFetcher, AuthError> {
    let client = build_http_client(fetch)?;
    let page_retry = RetryPolicy::new(fetch.retries, Duration::from_millis(fetch.base_delay_ms))?;

    retry(policy, |_: &FetchError| true, || {
        post_login(&client, login_url, credentials)
    })
    .await
    .map_err(|source| AuthError::Failed {
        url: login_url.to_string(),
        attempts: policy.tries(),
        source,
    })?;

    tracing::info!("Logged in as {}", credentials.user);
    Ok(HttpFetcher::from_client(client, page_retry))
}

/// Loads the credentials file named in `auth` and logs in
pub async fn login_from_config(
    auth: &AuthConfig,
    fetch: &FetchConfig,
) -> Result<HttpFetcher, AuthError> {
    let credentials = load_credentials(&auth.credentials_path)?;
    let policy = RetryPolicy::new(auth.retries, Duration::from_millis(auth.base_delay_ms))?;
    login(&credentials, &auth.login_url, fetch, &policy).await
}

async fn post_login(
    client: &Client,
    login_url: &str,
    credentials: &Credentials,
) -> Result<(), FetchError> {
    let response = client
        .post(login_url)
        .form(&[
            ("username", credentials.user.as_str()),
            ("password", credentials.password.as_str()),
        ])
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(login_url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: login_url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}

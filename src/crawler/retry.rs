//! Bounded exponential-backoff retry
//!
//! Wraps any fallible async operation. Only failures the caller classifies as
//! retryable are attempted again; everything else is returned immediately.

use crate::ConfigError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How many times to attempt an operation and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    tries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy making at most `tries` attempts
    ///
    /// The wait before attempt `n + 1` is `base_delay * 2^(n - 1)`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRetryCount` if `tries` is zero.
    pub fn new(tries: u32, base_delay: Duration) -> Result<Self, ConfigError> {
        if tries < 1 {
            return Err(ConfigError::InvalidRetryCount(tries));
        }
        Ok(Self { tries, base_delay })
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    /// Delay slept after the failed attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// Runs `operation` until it succeeds, fails permanently, or runs out of attempts
///
/// Every failed attempt is logged with its index and cause. A failure for
/// which `is_retryable` returns false is propagated without sleeping; after
/// the last attempt the final failure is propagated. No state is shared
/// between calls, so one policy can be reused freely.
///
/// # Example
///
/// ```no_run
/// use canton_crawler::crawler::{retry, RetryPolicy};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), std::io::Error> {
/// let policy = RetryPolicy::new(3, Duration::from_millis(500)).unwrap();
/// let body = retry(&policy, |_: &std::io::Error| true, || async {
///     tokio::fs::read_to_string("/tmp/flaky").await
/// })
/// .await?;
/// # let _ = body;
/// # Ok(())
/// # }
/// ```
pub async fn retry<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    is_retryable: R,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::warn!(
                    "Attempt {}/{} failed with error: {}",
                    attempt,
                    policy.tries,
                    err
                );

                if !is_retryable(&err) || attempt >= policy.tries {
                    return Err(err);
                }

                tokio::time::sleep(policy.delay_for(attempt)).await;
                attempt += 1;
            }
        }
    }
}

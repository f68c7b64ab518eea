//! Retry utility for transient failures in async operations
//!
//! Used by the event queues to re-attempt listener deliveries.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Fixed-delay retry policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Zero behaves as one.
    pub max_attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// A policy that makes exactly one attempt
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    fn attempts(&self) -> usize {
        self.max_attempts.max(1)
    }
}

/// Execute an async operation, retrying failures according to `policy`
///
/// Returns the first success, or the error from the final attempt.
///
/// # Examples
/// ```rust
/// use remcache::core::retry::{retry_async, RetryPolicy};
///
/// # async fn example() -> Result<u32, String> {
/// let value = retry_async("lookup", &RetryPolicy::default(), || async {
///     Ok::<u32, String>(7)
/// })
/// .await?;
/// # Ok(value)
/// # }
/// ```
pub async fn retry_async<F, T, E, Fut>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) if attempt < attempts => {
                log::debug!(
                    "Operation '{}' failed on attempt {}/{}, retrying in {:?}: {}",
                    operation_name,
                    attempt,
                    attempts,
                    policy.delay,
                    error
                );
                if !policy.delay.is_zero() {
                    sleep(policy.delay).await;
                }
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

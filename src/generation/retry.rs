//! Bounded retry around generation calls.

use crate::errors::GenerationError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Default number of extra attempts after the first failure.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Default pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Retry policy: every retryable error gets the same treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Run `op`, retrying retryable failures up to `max_retries` times.
    ///
    /// The last error is returned once the budget is spent. Errors for which
    /// `is_retryable()` is false are returned immediately.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, GenerationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        target = label,
                        attempt,
                        max_retries = self.max_retries,
                        error = %err,
                        "Generation failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

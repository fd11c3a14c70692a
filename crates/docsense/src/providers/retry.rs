//! Retry with exponential backoff for provider calls

use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{Error, Result};

/// Failure of a single attempt
#[derive(Debug)]
pub enum AttemptError {
    /// May succeed if tried again (network fault, 5xx, rate limit)
    Transient(Error),
    /// Will fail the same way every time (bad request, auth, unknown model)
    Permanent(Error),
}

impl AttemptError {
    /// Classify a non-success HTTP status. Client errors are permanent
    /// except request timeout and rate limiting.
    pub fn from_status(status: StatusCode, error: Error) -> Self {
        if status.is_client_error()
            && status != StatusCode::REQUEST_TIMEOUT
            && status != StatusCode::TOO_MANY_REQUESTS
        {
            Self::Permanent(error)
        } else {
            Self::Transient(error)
        }
    }
}

impl From<Error> for AttemptError {
    fn from(error: Error) -> Self {
        Self::Transient(error)
    }
}

/// Retry policy shared by the HTTP-backed providers
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `operation` until it succeeds, fails permanently or the retries
    /// are exhausted
    pub async fn run<F, Fut, T>(&self, label: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, AttemptError>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(AttemptError::Permanent(e)) => {
                    tracing::warn!("{} rejected, not retrying: {}", label, e);
                    return Err(e);
                }
                Err(AttemptError::Transient(e)) => {
                    if attempt < self.max_retries {
                        let delay = self.delay_for(attempt);
                        tracing::warn!(
                            "{} failed (attempt {}/{}): {}; retrying in {:?}",
                            label,
                            attempt + 1,
                            self.max_retries + 1,
                            e,
                            delay
                        );
                        sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::internal(format!("{} failed", label))))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}

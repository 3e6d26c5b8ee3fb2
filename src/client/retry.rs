//! Retry Policy
//!
//! Exponential backoff for requests against the optimization service.
//!
//! # Policy
//!
//! - **Rate limiting / unavailability**: HTTP 429 and 503 are retried for any method
//! - **Connection failures**: retried for any method (the request never reached the service)
//! - **Timeouts and other in-flight failures**: retried only for idempotent methods
//! - **Everything else**: returned immediately
//!
//! Delays grow as `base_delay * 2^attempt` with no jitter and are capped at
//! `max_delay`, which the transport clamps to the request timeout.
//!
//! # Example
//!
//! ```ignore
//! use optimization_mcp::client::retry::{RetryConfig, retry_with_backoff};
//!
//! let config = RetryConfig::default()
//!     .max_retries(3)
//!     .base_delay(Duration::from_millis(100));
//!
//! let body = retry_with_backoff(&config, &Method::GET, || transport.send_once(...)).await?;
//! ```

use crate::error::{NetworkFailure, TransportError};
use reqwest::Method;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry configuration
///
/// # Fields
///
/// * `max_retries` - Retries after the first attempt (default: 3)
/// * `base_delay` - Delay before the first retry (default: 1s)
/// * `max_delay` - Upper bound for any single delay (default: 30s)
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Number of retries after the initial attempt
    pub max_retries: u32,

    /// Delay before the first retry
    pub base_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of retries after the initial attempt
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the delay before the first retry
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the maximum delay between retries
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Total number of attempts, including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `attempt + 1`
    ///
    /// Uses exponential backoff: delay = base_delay * 2^attempt, capped at max_delay.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        2_u32
            .checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Check if a failed request should be retried
    pub fn should_retry(&self, method: &Method, error: &TransportError) -> bool {
        match error {
            TransportError::Status { status, .. } => should_retry_status(*status),
            TransportError::Network { kind, .. } => match kind {
                NetworkFailure::Connect => true,
                NetworkFailure::Timeout | NetworkFailure::Other => method.is_idempotent(),
            },
            _ => false,
        }
    }
}

/// Check if an HTTP status code should be retried
///
/// Only 429 Too Many Requests and 503 Service Unavailable are transient.
pub fn should_retry_status(status: u16) -> bool {
    matches!(status, 429 | 503)
}

/// Retry an operation with exponential backoff
///
/// The operation runs up to `config.max_attempts()` times. Errors rejected by
/// `should_retry` are returned immediately; otherwise the last error is
/// returned once attempts are exhausted.
pub async fn retry_with_backoff<F, T, Fut>(
    config: &RetryConfig,
    method: &Method,
    mut operation: F,
) -> Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let max_attempts = config.max_attempts();
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(
                        "Request succeeded on attempt {} after {} retries",
                        attempt + 1,
                        attempt
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt + 1 < max_attempts && config.should_retry(method, &e) {
                    let delay = config.calculate_delay(attempt);
                    tracing::warn!(
                        "Attempt {} failed: {}, retrying after {:?}",
                        attempt + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                } else {
                    tracing::debug!("Request failed after {} attempts: {}", attempt + 1, e);
                    return Err(e);
                }
            }
        }
    }
}

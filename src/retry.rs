//! Retry logic with exponential backoff
//!
//! The retry template consumed by the embedding model wrapper. Delays grow
//! exponentially (1s, 2s, 4s, 8s, 16s cap) with up to 10% jitter, each
//! attempt is bounded by a request timeout, and the whole operation by a
//! total timeout. Only retryable errors (see [`EmbedError::is_retryable`])
//! trigger another attempt.

use crate::error::{EmbedError, EmbedResult};
use crate::logging::{log_debug, log_error};

use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Retry policy configuration for embedding requests
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum total operation time
    pub total_timeout: Duration,
    /// Request timeout for individual attempts
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
            backoff_multiplier: 2.0,
            total_timeout: Duration::from_secs(300),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Retry executor that applies a [`RetryPolicy`] to async operations
#[derive(Debug)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl RetryExecutor {
    /// Create a new retry executor with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// The policy this executor applies.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute an operation with retry logic.
    ///
    /// # Errors
    ///
    /// Returns the last error once attempts are exhausted, a non-retryable
    /// error immediately, or [`EmbedError::Timeout`] when the total budget
    /// runs out.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> EmbedResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = EmbedResult<T>>,
    {
        let start_time = Instant::now();
        let mut last_error = None;

        for attempt in 1..=self.policy.max_attempts {
            if start_time.elapsed() >= self.policy.total_timeout {
                return Err(EmbedError::timeout(self.policy.total_timeout.as_secs()));
            }

            log_debug!(
                attempt = attempt,
                max_attempts = self.policy.max_attempts,
                "Executing request with retry logic"
            );

            let attempt_start = Instant::now();
            let error = match tokio::time::timeout(self.policy.request_timeout, operation()).await {
                Ok(Ok(response)) => {
                    log_debug!(
                        attempt = attempt,
                        duration_ms = attempt_start.elapsed().as_millis(),
                        "Request succeeded"
                    );
                    return Ok(response);
                }
                Ok(Err(error)) => error,
                Err(_elapsed) => EmbedError::timeout(self.policy.request_timeout.as_secs()),
            };

            let retryable = error.is_retryable();
            last_error = Some(error);

            if !retryable || attempt == self.policy.max_attempts {
                break;
            }

            let delay = self.calculate_delay(attempt);
            log_debug!(
                attempt = attempt,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis(),
                error = ?last_error.as_ref(),
                "Request failed, retrying after delay"
            );
            sleep(delay).await;
        }

        let final_error = last_error.unwrap_or_else(|| {
            EmbedError::request_failed("Maximum retry attempts exceeded".to_string(), None)
        });

        log_error!(
            total_duration_ms = start_time.elapsed().as_millis(),
            error = %final_error,
            "Request failed after all retry attempts"
        );

        Err(final_error)
    }

    /// Calculate delay for exponential backoff
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_seconds = self.policy.initial_delay.as_secs_f64()
            * self.policy.backoff_multiplier.powi((attempt - 1) as i32);

        let delay = Duration::from_secs_f64(delay_seconds.min(self.policy.max_delay.as_secs_f64()));

        // Add jitter to prevent thundering herd
        let jitter = fastrand::f64() * 0.1; // Up to 10% jitter
        Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter))
    }
}

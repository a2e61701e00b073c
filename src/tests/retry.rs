// Unit Tests for Retry Execution
//
// UNIT UNDER TEST: RetryExecutor
//
// BUSINESS RESPONSIBILITY:
//   - Retries transient failures with exponential backoff
//   - Stops immediately on non-retryable errors
//   - Bounds delays by the configured maximum
//
// TEST COVERAGE:
//   - Success on first attempt
//   - Recovery after transient failures
//   - Exhausted attempts return the last error
//   - Non-retryable errors short-circuit
//   - Backoff growth and cap

use crate::error::{EmbedError, EmbedResult};
use crate::retry::{RetryExecutor, RetryPolicy};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        backoff_multiplier: 2.0,
        total_timeout: Duration::from_secs(5),
        request_timeout: Duration::from_secs(1),
    }
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let executor = RetryExecutor::new(fast_policy(3));

    let result: EmbedResult<u32> = executor.execute(|| async { Ok(42) }).await;

    assert_eq!(result.unwrap(), 42);
}

#[tokio::test]
async fn test_recovers_after_transient_failures() {
    let executor = RetryExecutor::new(fast_policy(3));
    let attempts = AtomicU32::new(0);

    let result: EmbedResult<&str> = executor
        .execute(|| {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if attempt < 3 {
                    Err(EmbedError::request_failed("flaky", None))
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "recovered");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_exhausted_attempts_return_last_error() {
    let executor = RetryExecutor::new(fast_policy(2));
    let attempts = AtomicU32::new(0);

    let result: EmbedResult<()> = executor
        .execute(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(EmbedError::request_failed("still down", None)) }
        })
        .await;

    assert!(matches!(result, Err(EmbedError::RequestFailed { .. })));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_non_retryable_error_short_circuits() {
    let executor = RetryExecutor::new(fast_policy(5));
    let attempts = AtomicU32::new(0);

    let result: EmbedResult<()> = executor
        .execute(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(EmbedError::authentication_failed("bad key")) }
        })
        .await;

    assert!(matches!(result, Err(EmbedError::AuthenticationFailed { .. })));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_backoff_grows_exponentially_and_caps() {
    let executor = RetryExecutor::new(RetryPolicy {
        max_attempts: 5,
        initial_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(4),
        backoff_multiplier: 2.0,
        total_timeout: Duration::from_secs(300),
        request_timeout: Duration::from_secs(60),
    });

    // Jitter adds up to 10% on top of the base delay
    let first = executor.calculate_delay(1);
    assert!(first >= Duration::from_secs(1));
    assert!(first <= Duration::from_millis(1100));

    let second = executor.calculate_delay(2);
    assert!(second >= Duration::from_secs(2));
    assert!(second <= Duration::from_millis(2200));

    // Capped at max_delay (plus jitter) despite further growth
    let fifth = executor.calculate_delay(5);
    assert!(fifth <= Duration::from_millis(4400));
}

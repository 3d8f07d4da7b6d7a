//! Bounded retry with exponential backoff.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};

/// How many times an operation runs and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        )
    }
}

impl RetryPolicy {
    /// An operation always runs at least once.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait after the zero-indexed `attempt` failed: `2^attempt * base_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Runs `operation` until it succeeds or the policy's attempts are spent.
///
/// The operation receives the zero-indexed attempt number. The last error is
/// returned on exhaustion.
pub async fn execute_with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;

    loop {
        debug!(attempt = attempt + 1, "Executing operation");

        match operation(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempt = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                warn!(attempt = attempt + 1, error = %err, "Attempt failed");

                if attempt + 1 >= policy.max_attempts {
                    warn!(attempts = policy.max_attempts, "All retry attempts exhausted");
                    return Err(err);
                }

                let delay = policy.delay_for(attempt);
                debug!(delay_ms = delay.as_millis() as u64, "Backing off before retry");
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_delay_doubles_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_zero_attempts_is_clamped() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_last_attempt_after_backoff() {
        let policy = RetryPolicy::default();
        let start = Instant::now();
        let mut calls = Vec::new();

        let result: Result<&str, String> = execute_with_retry(&policy, |attempt| {
            calls.push(attempt);
            async move {
                if attempt < 2 {
                    Err(format!("failure {attempt}"))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls, vec![0, 1, 2]);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3000), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(3100), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_error_when_exhausted() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let mut count = 0;

        let result: Result<(), String> = execute_with_retry(&policy, |attempt| {
            count += 1;
            async move { Err(format!("failure {attempt}")) }
        })
        .await;

        assert_eq!(result, Err("failure 2".to_string()));
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_first_success_does_not_wait() {
        let policy = RetryPolicy::default();
        let start = std::time::Instant::now();
        let result: Result<u8, String> = execute_with_retry(&policy, |_| async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}

// ABOUTME: Bounded-attempt retry wrapper applied to every provisioning step
// ABOUTME: Sleeps between attempts with optional capped exponential backoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::errors::{AppError, AppResult};

/// How often and how patiently an operation is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Upper bound for the delay; equal to `initial_delay` means a fixed delay
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Fixed delay between attempts
    #[must_use]
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay: delay,
            max_delay: delay,
        }
    }

    /// Single attempt, no retry
    #[must_use]
    pub const fn once() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    /// Delay to wait after `failed_attempts` failures (1-based)
    #[must_use]
    pub fn delay_after(&self, failed_attempts: u32) -> Duration {
        let doublings = failed_attempts.saturating_sub(1).min(31);
        self.initial_delay
            .saturating_mul(1 << doublings)
            .min(self.max_delay.max(self.initial_delay))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(3, Duration::from_millis(1500))
    }
}

/// Run `operation` until it succeeds or `policy.max_attempts` is exhausted
///
/// The operation must be idempotent. Validation errors end the loop on the
/// attempt that produced them, since repeating the call cannot change them.
///
/// # Errors
///
/// Returns a `StepFailed` error naming `label`, the attempt count and the last
/// failure, which stays reachable as the source
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_validation() || attempt >= max_attempts => {
                return Err(AppError::step_failed(label, attempt, error));
            }
            Err(error) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    step = label,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Attempt failed, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::fixed(max_attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&quick(3), "noop", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AppError>(7)
        })
        .await
        .unwrap();

        assert_eq!(result, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&quick(3), "flaky", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(AppError::external_service("Qdrant", "HTTP 503"))
            } else {
                Ok("done")
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_wraps_last_error() {
        let calls = AtomicU32::new(0);
        let error = with_retry(&quick(2), "postgres", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(AppError::external_service("PostgreSQL", format!("attempt {n}")))
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(error.code, ErrorCode::StepFailed);
        assert_eq!(
            error.message,
            "Failed postgres after 2 attempts: PostgreSQL: attempt 1"
        );
    }

    #[tokio::test]
    async fn validation_errors_stop_at_once_but_keep_the_label() {
        let calls = AtomicU32::new(0);
        let error = with_retry(&quick(5), "naming", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(AppError::invalid_input("bad name"))
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(error.code, ErrorCode::StepFailed);
        assert_eq!(error.message, "Failed naming after 1 attempt: bad name");

        let source = std::error::Error::source(&error).unwrap();
        assert_eq!(source.to_string(), "bad name");
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 6,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after(3), Duration::from_millis(350));
        assert_eq!(policy.delay_after(10), Duration::from_millis(350));
    }

    #[test]
    fn fixed_policy_keeps_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), policy.delay_after(3));
    }
}

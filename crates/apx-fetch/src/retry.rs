//! Retry loop with exponential backoff.
//!
//! The delay after attempt `n` (1-based) is `base * 2^n`: with the default
//! 1 second base, 2 s after the first failure and 4 s after the second. There
//! is no jitter and no cap beyond the attempt count. Sleeping suspends only
//! the calling task.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Bounded exponential backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Base delay.
    pub base: Duration,
}

impl Backoff {
    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Terminal outcome of a failed retry loop.
#[derive(Debug)]
pub enum RetryError<E> {
    /// All attempts failed with retryable errors.
    Exhausted { attempts: u32, last: E },
    /// An attempt failed with an error that must not be retried.
    Aborted { attempt: u32, error: E },
}

/// Run `op` until it succeeds, a non-retryable error occurs, or the attempt
/// budget is spent. `op` receives the 1-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut>(backoff: &Backoff, mut op: F) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if !error.is_retryable() => {
                return Err(RetryError::Aborted { attempt, error });
            }
            Err(last) if attempt >= backoff.max_attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts = backoff.max_attempts,
                    "final attempt failed: {last}"
                );
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last,
                });
            }
            Err(error) => {
                let delay = backoff.delay_after(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = backoff.max_attempts,
                    "attempt failed, retrying in {delay:?}: {error}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

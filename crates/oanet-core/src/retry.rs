//! Opt-in retry with exponential backoff

use std::time::Duration;

/// Retry policy for rate-limited or failing requests.
///
/// The default performs no retries: the first failure is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_secs(2),
        }
    }

    /// Backoff before retry `attempt` (1-based): base, 2×base, 4×base, ...
    /// Saturates at `Duration::MAX`.
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        self.base_delay
            .checked_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
            .unwrap_or(Duration::MAX)
    }
}

/// Errors that know whether another attempt could succeed
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Retry a fallible operation according to `policy`.
///
/// Returns `Ok(T)` on first success, or the final `Err` on exhaustion or
/// on a non-retryable error.
pub fn retry_with_backoff<T, E>(
    label: &str,
    policy: &RetryPolicy,
    mut attempt_fn: impl FnMut() -> Result<T, E>,
) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < policy.max_retries && e.is_retryable() => {
                attempt += 1;
                let delay = policy.backoff_duration(attempt);
                log::warn!(
                    "{label}: attempt {attempt}/{} failed: {e}, retrying in {delay:?}",
                    policy.max_retries
                );
                std::thread::sleep(delay);
            }
            Err(e) => {
                log::debug!("{label}: giving up: {e}");
                return Err(e);
            }
        }
    }
}

impl Retryable for crate::stream::StreamError {
    fn is_retryable(&self) -> bool {
        crate::stream::StreamError::is_retryable(self)
    }
}

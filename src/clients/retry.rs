//! Retry policy for the request executor.

use std::time::Duration;

use crate::config::ClientConfig;

/// Statuses considered transient and retried with backoff.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Returns `true` if `status` is one of [`RETRYABLE_STATUSES`].
#[must_use]
pub const fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Exponential backoff without jitter.
///
/// Attempt `n` (zero-based) sleeps `base_wait * 2^n` before the next try,
/// optionally capped. A logical call makes at most `max_retries + 1` tries.
///
/// # Example
///
/// ```rust
/// use graylog_api::clients::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(1));
/// let delays: Vec<_> = (0..3).map(|n| policy.delay_for(n)).collect();
/// assert_eq!(
///     delays,
///     vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)]
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_wait: Duration,
    max_wait: Option<Duration>,
}

impl RetryPolicy {
    /// Creates an uncapped policy.
    #[must_use]
    pub const fn new(max_retries: u32, base_wait: Duration) -> Self {
        Self {
            max_retries,
            base_wait,
            max_wait: None,
        }
    }

    /// Caps a single sleep at `max_wait`.
    #[must_use]
    pub const fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Builds the policy from a client configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        let policy = Self::new(config.max_retries(), config.retry_wait());
        match config.max_retry_wait() {
            Some(cap) => policy.with_max_wait(cap),
            None => policy,
        }
    }

    /// Returns the number of retries after the first attempt.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the total number of tries per logical call.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Returns `true` if another try may follow the zero-based `attempt`.
    #[must_use]
    pub const fn has_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Returns the sleep after the zero-based `attempt` failed.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        let delay = self.base_wait.saturating_mul(factor);
        self.max_wait.map_or(delay, |cap| delay.min(cap))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_MAX_RETRIES,
            crate::config::DEFAULT_RETRY_WAIT,
        )
    }
}

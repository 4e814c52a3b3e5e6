//! Retry policy and status classification.

use std::time::Duration;

/// Exponential backoff settings for a fetch sequence.
///
/// The delay starts at `initial_delay` and doubles after every retry. There
/// is no cap and no jitter.
///
/// # Defaults
///
/// - `max_attempts`: 5
/// - `initial_delay`: 1 second
///
/// # Example
///
/// ```
/// use mindconnect::fetch::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .with_max_attempts(3)
///     .with_initial_delay(Duration::from_millis(250));
///
/// assert_eq!(policy.next_delay(Duration::from_millis(250)), Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one.
    ///
    /// A value of 1 means no retries.
    pub max_attempts: u32,

    /// Delay before the first retry.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Default maximum attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

    /// Default initial delay (1 second).
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

    /// Factor applied to the delay after each retry.
    pub const MULTIPLIER: u32 = 2;

    /// Minimum value for `max_attempts`.
    pub const MIN_MAX_ATTEMPTS: u32 = 1;

    /// Creates a policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
        }
    }

    /// Sets the maximum number of attempts.
    ///
    /// # Panics
    ///
    /// Panics if `max_attempts` is less than 1.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        assert!(
            max_attempts >= Self::MIN_MAX_ATTEMPTS,
            "max_attempts must be at least 1"
        );
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay before the first retry.
    ///
    /// Zero is allowed and produces a tight retry loop; tests usually pair
    /// it with [`InstantSleeper`](crate::time::InstantSleeper) instead.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Returns the delay that follows `current`.
    ///
    /// Saturates at `Duration::MAX` rather than overflowing.
    #[must_use]
    pub const fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(Self::MULTIPLIER)
    }

    /// Returns true if another attempt may follow attempt number `attempt`
    /// (1 = first attempt).
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// How the fetcher treats a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// 2xx: hand the response to the caller.
    Success,
    /// 401: stop immediately.
    Unauthorized,
    /// 429 or anything from 500 up: retry while attempts remain.
    Transient,
    /// Anything else: stop immediately.
    NonRetryable,
}

impl Disposition {
    /// Classifies a response status.
    #[must_use]
    pub fn of(status: http::StatusCode) -> Self {
        if status.is_success() {
            Self::Success
        } else if status == http::StatusCode::UNAUTHORIZED {
            Self::Unauthorized
        } else if status == http::StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 {
            Self::Transient
        } else {
            Self::NonRetryable
        }
    }
}

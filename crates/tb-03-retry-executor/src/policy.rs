//! # Retry policy
//!
//! The delay before retry `n` (0-indexed) is `base_delay × 2^n`, clamped to
//! `max_delay` when one is set. With `max_retries = 3` an operation runs at
//! most 4 times.
//!
//! ```rust
//! use std::time::Duration;
//! use tb_03_retry_executor::RetryPolicy;
//!
//! let policy = RetryPolicy::new(3, Duration::from_millis(100)).unwrap();
//! assert_eq!(policy.delay_for(0), Duration::from_millis(100));
//! assert_eq!(policy.delay_for(2), Duration::from_millis(400));
//! assert_eq!(policy.total_attempts(), 4);
//! ```

use std::time::Duration;
use thiserror::Error;

/// Invalid retry parameters. Raised at construction, never at call time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryConfigError {
    #[error("max_retries must be non-negative, got {0}")]
    NegativeMaxRetries(i64),

    #[error("base_delay must be positive")]
    NonPositiveBaseDelay,

    #[error("max_delay ({max:?}) must not be below base_delay ({base:?})")]
    MaxDelayBelowBase { base: Duration, max: Duration },
}

/// Validated retry parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    /// 3 retries starting at 1s, uncapped.
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Result<Self, RetryConfigError> {
        if base_delay.is_zero() {
            return Err(RetryConfigError::NonPositiveBaseDelay);
        }
        Ok(Self {
            max_retries,
            base_delay,
            max_delay: None,
        })
    }

    /// Build from untrusted integers (configuration values).
    pub fn from_raw(max_retries: i64, base_delay_ms: i64) -> Result<Self, RetryConfigError> {
        if max_retries < 0 {
            return Err(RetryConfigError::NegativeMaxRetries(max_retries));
        }
        let max_retries = u32::try_from(max_retries).unwrap_or(u32::MAX);
        let base_delay_ms =
            u64::try_from(base_delay_ms).map_err(|_| RetryConfigError::NonPositiveBaseDelay)?;
        Self::new(max_retries, Duration::from_millis(base_delay_ms))
    }

    /// Cap every delay at `max_delay`.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Result<Self, RetryConfigError> {
        if max_delay < self.base_delay {
            return Err(RetryConfigError::MaxDelayBelowBase {
                base: self.base_delay,
                max: max_delay,
            });
        }
        self.max_delay = Some(max_delay);
        Ok(self)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Initial attempt plus retries.
    pub fn total_attempts(&self) -> u64 {
        u64::from(self.max_retries) + 1
    }

    /// Delay to sleep after failed attempt `attempt` (0-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let uncapped = 2u32
            .checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX);

        match self.max_delay {
            Some(max) => uncapped.min(max),
            None => uncapped,
        }
    }
}

//! # Retry executor
//!
//! Runs an operation up to `max_retries + 1` times, sleeping
//! [`RetryPolicy::delay_for`] between attempts. The last error is returned
//! unchanged.
//!
//! Sits above the request/reply protocol: a round trip's own timeout is one
//! attempt's deadline, not a retry policy.

use crate::policy::RetryPolicy;
use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

/// Retries operations according to a [`RetryPolicy`].
#[derive(Clone, Debug, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    label: Option<String>,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            label: None,
        }
    }

    /// Name the operation in retry logs.
    #[must_use]
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("operation")
    }

    /// Retry `operation` on every error.
    pub async fn with_retry<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.with_retry_when(operation, |_| true).await
    }

    /// Retry `operation` while `should_retry` accepts the error.
    ///
    /// A rejected error is returned immediately.
    pub async fn with_retry_when<T, E, F, Fut, P>(&self, mut operation: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let total = self.policy.total_attempts();
        let mut attempt: u32 = 0;
        loop {
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(operation = self.label(), attempts = attempt + 1, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if attempt >= self.policy.max_retries() {
                return Err(error);
            }
            if !should_retry(&error) {
                debug!(operation = self.label(), error = %error, "Error is not retriable");
                return Err(error);
            }

            let delay = self.policy.delay_for(attempt);
            warn!(
                operation = self.label(),
                attempt = attempt + 1,
                total,
                delay_ms = delay.as_millis(),
                error = %error,
                "Attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Blocking counterpart of [`with_retry`](Self::with_retry).
    ///
    /// Sleeps the calling thread; never call it on an async executor thread.
    pub fn with_retry_blocking<T, E, F>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: Display,
    {
        let total = self.policy.total_attempts();
        let mut attempt: u32 = 0;
        loop {
            let error = match operation() {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            if attempt >= self.policy.max_retries() {
                return Err(error);
            }

            let delay = self.policy.delay_for(attempt);
            warn!(
                operation = self.label(),
                attempt = attempt + 1,
                total,
                delay_ms = delay.as_millis(),
                error = %error,
                "Attempt failed, retrying (blocking)"
            );
            std::thread::sleep(delay);
            attempt += 1;
        }
    }
}

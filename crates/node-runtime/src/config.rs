//! # Node Configuration
//!
//! Runtime parameters for a TaskBus process, read once from the environment
//! and validated before anything connects.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TB_BUS_URL` | `memory://` |
//! | `TB_LLM_TASK_CHANNEL` | `llm_tasks` |
//! | `TB_BROWSER_TASK_CHANNEL` | `browser_tasks` |
//! | `TB_ECHO_TASK_CHANNEL` | `echo_tasks` |
//! | `TB_REQUEST_TIMEOUT_MS` | `60000` |
//! | `TB_RETRY_MAX` | `3` |
//! | `TB_RETRY_BASE_DELAY_MS` | `1000` |

use shared_types::channels::{BROWSER_TASKS, ECHO_TASKS, LLM_TASKS};
use std::env;
use std::time::Duration;
use tb_03_retry_executor::{RetryConfigError, RetryPolicy};
use thiserror::Error;

pub const DEFAULT_BUS_URL: &str = "memory://";
pub const DEFAULT_REQUEST_TIMEOUT_MS: i64 = 60_000;
pub const DEFAULT_RETRY_MAX: i64 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: i64 = 1_000;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be an integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("TB_REQUEST_TIMEOUT_MS must be positive, got {0}")]
    NonPositiveTimeout(i64),

    #[error("{var} must not be empty")]
    Empty { var: &'static str },

    #[error("Invalid retry configuration: {0}")]
    Retry(#[from] RetryConfigError),
}

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// `memory://` or `redis://host:port/db`.
    pub bus_url: String,
    pub llm_task_channel: String,
    pub browser_task_channel: String,
    pub echo_task_channel: String,
    /// Deadline for one request/reply round trip.
    pub request_timeout: Duration,
    /// Retry schedule wrapped around round trips.
    pub retry: RetryPolicy,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bus_url: DEFAULT_BUS_URL.to_string(),
            llm_task_channel: LLM_TASKS.to_string(),
            browser_task_channel: BROWSER_TASKS.to_string(),
            echo_task_channel: ECHO_TASKS.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS as u64),
            retry: RetryPolicy::default(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let text = |var: &'static str, default: &str| -> Result<String, ConfigError> {
            match lookup(var) {
                None => Ok(default.to_string()),
                Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { var }),
                Some(value) => Ok(value.trim().to_string()),
            }
        };
        let number = |var: &'static str, default: i64| -> Result<i64, ConfigError> {
            match lookup(var) {
                None => Ok(default),
                Some(value) => value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber { var, value }),
            }
        };

        let timeout_ms = number("TB_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?;
        let timeout_ms = u64::try_from(timeout_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or(ConfigError::NonPositiveTimeout(timeout_ms))?;

        let retry = RetryPolicy::from_raw(
            number("TB_RETRY_MAX", DEFAULT_RETRY_MAX)?,
            number("TB_RETRY_BASE_DELAY_MS", DEFAULT_RETRY_BASE_DELAY_MS)?,
        )?;

        Ok(Self {
            bus_url: text("TB_BUS_URL", DEFAULT_BUS_URL)?,
            llm_task_channel: text("TB_LLM_TASK_CHANNEL", LLM_TASKS)?,
            browser_task_channel: text("TB_BROWSER_TASK_CHANNEL", BROWSER_TASKS)?,
            echo_task_channel: text("TB_ECHO_TASK_CHANNEL", ECHO_TASKS)?,
            request_timeout: Duration::from_millis(timeout_ms),
            retry,
        })
    }
}

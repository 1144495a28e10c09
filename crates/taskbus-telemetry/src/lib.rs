//! # TaskBus Telemetry
//!
//! Structured logging for TaskBus processes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use taskbus_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TB_SERVICE_NAME` | `taskbus` | Service name in logs |
//! | `RUST_LOG` / `TB_LOG_LEVEL` | `info` | Log filter |
//! | `TB_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `TB_JSON_LOGS` | `false` (`true` in containers) | JSON lines output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::env_filter;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,

    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },
}

/// Install logging for this process.
///
/// Returns a guard to hold for the lifetime of the application. A second
/// call fails with [`TelemetryError::AlreadyInitialized`].
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

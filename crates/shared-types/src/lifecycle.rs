//! # Service Lifecycle
//!
//! ```text
//! Created ──start──→ Running ──stop──→ Stopping ──→ Stopped
//!    └──────────────────stop──────────────────────────↑
//! ```
//!
//! A stopped service is never restarted; build a new one instead.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a service runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    /// Constructed, not yet subscribed.
    Created,
    /// Subscribed and processing tasks.
    Running,
    /// Stop requested; waiting for the in-flight task.
    Stopping,
    /// Unsubscribed. Terminal.
    Stopped,
}

impl ServiceState {
    /// Returns true while the service accepts tasks.
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true once the service can no longer be started.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopping | Self::Stopped)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Stopping => write!(f, "stopping"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Snapshot of a service runtime for monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub service_name: String,
    pub task_channel: String,
    pub state: ServiceState,
    pub running: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(ServiceState::Running.is_running());
        assert!(!ServiceState::Created.is_running());
        assert!(ServiceState::Stopped.is_terminal());
        assert!(ServiceState::Stopping.is_terminal());
        assert!(!ServiceState::Created.is_terminal());
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let value = serde_json::to_value(ServiceState::Stopping).unwrap();
        assert_eq!(value, "stopping");
    }
}

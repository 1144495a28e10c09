//! Service runtime error types.

use shared_bus::BusError;
use thiserror::Error;

/// Errors from service construction and lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// `start()` after `stop()`. Build a new runtime instead.
    #[error("Service {service} has been stopped and cannot be restarted")]
    Terminated { service: String },

    /// A route was registered with an empty task type.
    #[error("Invalid route for {service}: task type must not be empty")]
    EmptyTaskType { service: String },

    /// The same task type was registered twice.
    #[error("Duplicate route for {service}: {task_type}")]
    DuplicateRoute { service: String, task_type: String },

    /// A router was built without any route.
    #[error("Service {service} has no task routes")]
    NoRoutes { service: String },

    /// The task channel subscription could not be established.
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),
}

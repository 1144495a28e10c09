//! # Typed Task Commands
//!
//! Workers know their task types at compile time. A [`TaskCommand`] is the
//! closed set of payload variants for one worker; the open map stays at the
//! wire boundary.

use crate::task::{Task, TaskPayload};
use serde_json::Value;
use thiserror::Error;

/// Errors turning a task into a typed command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unsupported task type: {0}")]
    UnsupportedTaskType(String),

    #[error("Missing field '{field}' for task type {task_type}")]
    MissingField {
        task_type: String,
        field: &'static str,
    },

    #[error("Invalid field '{field}' for task type {task_type}: {reason}")]
    InvalidField {
        task_type: String,
        field: &'static str,
        reason: String,
    },
}

/// A closed set of task variants with their wire mapping.
pub trait TaskCommand: Sized {
    /// Wire task type of this variant.
    fn task_type(&self) -> &'static str;

    /// Wire payload of this variant.
    fn to_payload(&self) -> TaskPayload;

    /// Parse a wire type + payload.
    fn parse(task_type: &str, payload: &TaskPayload) -> Result<Self, CommandError>;

    fn from_task(task: &Task) -> Result<Self, CommandError> {
        Self::parse(&task.task_type, &task.payload)
    }
}

/// Read a required, non-empty string field.
pub fn required_str(
    payload: &TaskPayload,
    task_type: &str,
    field: &'static str,
) -> Result<String, CommandError> {
    match payload.get(field) {
        None | Some(Value::Null) => Err(CommandError::MissingField {
            task_type: task_type.to_string(),
            field,
        }),
        Some(Value::String(s)) if s.is_empty() => Err(CommandError::MissingField {
            task_type: task_type.to_string(),
            field,
        }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(CommandError::InvalidField {
            task_type: task_type.to_string(),
            field,
            reason: format!("expected string, got {other}"),
        }),
    }
}

/// Read an optional string field. Absent, null and empty all read as `None`.
pub fn optional_str(
    payload: &TaskPayload,
    task_type: &str,
    field: &'static str,
) -> Result<Option<String>, CommandError> {
    match required_str(payload, task_type, field) {
        Ok(s) => Ok(Some(s)),
        Err(CommandError::MissingField { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

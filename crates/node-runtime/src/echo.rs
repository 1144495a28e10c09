//! Echo service: replies with the message it was given. Used for smoke
//! testing a deployment end to end.

use serde_json::Value;
use shared_types::{Task, TaskOutcome};
use tb_01_service_runtime::{handler_fn, RuntimeError, TaskRouter};

pub const ECHO: &str = "echo";
pub const ECHO_SERVICE_NAME: &str = "EchoService";

/// `echo {message}` → `{success: true, response: message}`. A task without a
/// message still succeeds, answering `"No message provided"`.
pub fn echo_service() -> Result<TaskRouter, RuntimeError> {
    TaskRouter::builder(ECHO_SERVICE_NAME)
        .route(ECHO, handler_fn(|task: Task| async move { Ok(echo(&task)) }))
        .build()
}

fn echo(task: &Task) -> TaskOutcome {
    match task.payload.get("message") {
        None | Some(Value::Null) => TaskOutcome::success_with("response", "No message provided"),
        Some(message) => TaskOutcome::success_with("response", message.clone()),
    }
}

//! Inbound port: what a concrete service plugs into the runtime.

use async_trait::async_trait;
use shared_types::{Task, TaskOutcome};

/// A task-processing service.
///
/// `process_task` reports ordinary business failures as
/// `Ok(TaskOutcome::failure(..))`. An `Err` (or a panic) is unexpected; the
/// runtime logs it and still replies with a failure outcome.
#[async_trait]
pub trait TaskService: Send + Sync + 'static {
    /// Service name used in logs and failure messages.
    fn name(&self) -> &str;

    /// Process one task.
    async fn process_task(&self, task: &Task) -> anyhow::Result<TaskOutcome>;
}

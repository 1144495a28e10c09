//! # Task Dispatcher
//!
//! Per-message callback of a service's task channel subscription:
//!
//! 1. Validate mandatory fields (`id`, `type`, `payload`); drop on failure.
//! 2. Reconstruct the [`Task`].
//! 3. Call [`TaskService::process_task`]; errors and panics become failure
//!    outcomes.
//! 4. Publish a [`ReplyEnvelope`] when the task carries a complete reply route.

use crate::ports::inbound::TaskService;
use async_trait::async_trait;
use futures::FutureExt;
use shared_bus::{MessageBus, MessageHandler};
use shared_types::{BusMessage, EnvelopeError, ReplyEnvelope, ReplyRoute, Task, TaskOutcome};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Bridges a bus subscription to a [`TaskService`].
pub struct TaskDispatcher {
    service: Arc<dyn TaskService>,
    bus: MessageBus,
    task_channel: String,
}

impl TaskDispatcher {
    pub fn new(service: Arc<dyn TaskService>, bus: MessageBus, task_channel: impl Into<String>) -> Self {
        Self {
            service,
            bus,
            task_channel: task_channel.into(),
        }
    }

    /// Run one task through the service, never failing.
    pub async fn execute(&self, task: &Task) -> TaskOutcome {
        let name = self.service.name();
        match AssertUnwindSafe(self.service.process_task(task))
            .catch_unwind()
            .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!(
                    service = %name,
                    task_id = %task.id,
                    correlation_id = ?task.correlation_id,
                    error = %e,
                    "Error handling queued task"
                );
                TaskOutcome::failure(format!("{name} failed to process task: {e}"))
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(
                    service = %name,
                    task_id = %task.id,
                    correlation_id = ?task.correlation_id,
                    error = %reason,
                    "Task handler panicked"
                );
                TaskOutcome::failure(format!("{name} failed to process task: {reason}"))
            }
        }
    }

    async fn reply(&self, route: &ReplyRoute, outcome: TaskOutcome) {
        let envelope = ReplyEnvelope::new(route.correlation_id.clone(), outcome);
        match self.bus.publish(&route.channel, &envelope).await {
            Ok(_) => info!(
                channel = %route.channel,
                correlation_id = %route.correlation_id,
                "Published response to reply channel"
            ),
            Err(e) => error!(
                channel = %route.channel,
                correlation_id = %route.correlation_id,
                error = %e,
                "Failed to publish response to reply channel"
            ),
        }
    }
}

#[async_trait]
impl MessageHandler for TaskDispatcher {
    async fn handle(&self, message: BusMessage) -> anyhow::Result<()> {
        let name = self.service.name();
        // Kept aside so a task with a usable route but a bad body still gets
        // a failure reply.
        let raw_route = raw_reply_route(&message);

        let task = match Task::from_message(message) {
            Ok(task) => task,
            Err(e @ EnvelopeError::MissingField(_)) => {
                error!(
                    service = %name,
                    channel = %self.task_channel,
                    error = %e,
                    "Invalid task data received from queue"
                );
                return Ok(());
            }
            Err(e) => {
                error!(
                    service = %name,
                    channel = %self.task_channel,
                    error = %e,
                    "Invalid task data received from queue"
                );
                if let Some(route) = raw_route {
                    let outcome = TaskOutcome::failure(format!("{name} failed to process task: {e}"));
                    self.reply(&route, outcome).await;
                }
                return Ok(());
            }
        };

        let route = match task.reply_route() {
            Ok(route) => route,
            Err(e) => {
                warn!(
                    service = %name,
                    task_id = %task.id,
                    error = %e,
                    "Cannot send specific reply for task"
                );
                None
            }
        };

        info!(
            service = %name,
            task_id = %task.id,
            task_type = %task.task_type,
            correlation_id = ?task.correlation_id,
            "Received task"
        );

        let outcome = self.execute(&task).await;

        info!(
            service = %name,
            task_id = %task.id,
            correlation_id = ?task.correlation_id,
            success = outcome.success,
            "Processed queued task"
        );

        if let Some(route) = route {
            self.reply(&route, outcome).await;
        }
        Ok(())
    }
}

fn raw_reply_route(message: &BusMessage) -> Option<ReplyRoute> {
    let correlation_id = message.get("correlation_id")?.as_str()?;
    let channel = message.get("reply_to_channel")?.as_str()?;
    Some(ReplyRoute {
        correlation_id: correlation_id.to_string(),
        channel: channel.to_string(),
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

//! # Task Router
//!
//! Registration table from task type to handler. Validated once when built,
//! so a misconfigured service fails at startup instead of on its first task.
//!
//! ```text
//! Task{type: "echo"} ──→ routes["echo"] ──→ TaskHandler::handle
//! Task{type: "???"}  ──→ failure("Unsupported task type for <service>: ???")
//! ```

use super::error::RuntimeError;
use crate::ports::inbound::TaskService;
use async_trait::async_trait;
use shared_types::{Task, TaskOutcome};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

/// Handles one task type.
#[async_trait]
pub trait TaskHandler: Send + Sync + 'static {
    async fn handle(&self, task: &Task) -> anyhow::Result<TaskOutcome>;
}

/// [`TaskHandler`] backed by an async closure.
pub struct FnHandler<F>(F);

/// Wrap an async closure taking an owned [`Task`] as a handler.
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Task) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<TaskOutcome>> + Send + 'static,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> TaskHandler for FnHandler<F>
where
    F: Fn(Task) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<TaskOutcome>> + Send + 'static,
{
    async fn handle(&self, task: &Task) -> anyhow::Result<TaskOutcome> {
        (self.0)(task.clone()).await
    }
}

/// Builder for [`TaskRouter`].
pub struct TaskRouterBuilder {
    service_name: String,
    routes: Vec<(String, Arc<dyn TaskHandler>)>,
}

impl TaskRouterBuilder {
    /// Register `handler` for `task_type`.
    #[must_use]
    pub fn route(mut self, task_type: impl Into<String>, handler: impl TaskHandler) -> Self {
        self.routes.push((task_type.into(), Arc::new(handler)));
        self
    }

    /// Register an already shared handler.
    #[must_use]
    pub fn route_shared(mut self, task_type: impl Into<String>, handler: Arc<dyn TaskHandler>) -> Self {
        self.routes.push((task_type.into(), handler));
        self
    }

    /// Validate and build the router.
    ///
    /// Rejects empty task types, duplicates and an empty table.
    pub fn build(self) -> Result<TaskRouter, RuntimeError> {
        if self.routes.is_empty() {
            return Err(RuntimeError::NoRoutes {
                service: self.service_name,
            });
        }

        let mut routes = HashMap::with_capacity(self.routes.len());
        for (task_type, handler) in self.routes {
            if task_type.trim().is_empty() {
                return Err(RuntimeError::EmptyTaskType {
                    service: self.service_name,
                });
            }
            if routes.contains_key(&task_type) {
                return Err(RuntimeError::DuplicateRoute {
                    service: self.service_name,
                    task_type,
                });
            }
            routes.insert(task_type, handler);
        }

        Ok(TaskRouter {
            service_name: self.service_name,
            routes,
        })
    }
}

/// A [`TaskService`] dispatching on the task type.
pub struct TaskRouter {
    service_name: String,
    routes: HashMap<String, Arc<dyn TaskHandler>>,
}

impl TaskRouter {
    pub fn builder(service_name: impl Into<String>) -> TaskRouterBuilder {
        TaskRouterBuilder {
            service_name: service_name.into(),
            routes: Vec::new(),
        }
    }

    /// Registered task types, sorted.
    pub fn task_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn supports(&self, task_type: &str) -> bool {
        self.routes.contains_key(task_type)
    }
}

#[async_trait]
impl TaskService for TaskRouter {
    fn name(&self) -> &str {
        &self.service_name
    }

    async fn process_task(&self, task: &Task) -> anyhow::Result<TaskOutcome> {
        let Some(handler) = self.routes.get(&task.task_type) else {
            warn!(
                service = %self.service_name,
                task_id = %task.id,
                task_type = %task.task_type,
                "Unsupported task type"
            );
            return Ok(TaskOutcome::failure(format!(
                "Unsupported task type for {}: {}",
                self.service_name, task.task_type
            )));
        };
        handler.handle(task).await
    }
}

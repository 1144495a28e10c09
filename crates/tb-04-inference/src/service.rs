//! Inference service: answers `analyze_content` tasks through an
//! [`InferenceProvider`].

use crate::domain::commands::InferenceRequest;
use crate::ports::outbound::InferenceProvider;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{CommandError, Task, TaskCommand, TaskOutcome};
use std::sync::Arc;
use tb_01_service_runtime::TaskService;
use tracing::{error, info, warn};

pub const DEFAULT_SERVICE_NAME: &str = "InferenceService";

pub struct InferenceService {
    name: String,
    provider: RwLock<Option<Arc<dyn InferenceProvider>>>,
}

impl InferenceService {
    pub fn new(provider: Option<Arc<dyn InferenceProvider>>) -> Self {
        Self::with_name(DEFAULT_SERVICE_NAME, provider)
    }

    pub fn with_name(name: impl Into<String>, provider: Option<Arc<dyn InferenceProvider>>) -> Self {
        let name = name.into();
        match &provider {
            Some(p) => info!(service = %name, provider = %p.describe(), "Inference provider configured"),
            None => warn!(service = %name, "Inference provider not configured at initialization"),
        }
        Self {
            name,
            provider: RwLock::new(provider),
        }
    }

    /// Replace the provider. Tasks already running keep the old one.
    pub fn set_provider(&self, provider: Arc<dyn InferenceProvider>) {
        info!(service = %self.name, provider = %provider.describe(), "Inference provider configured");
        *self.provider.write() = Some(provider);
    }

    pub fn has_provider(&self) -> bool {
        self.provider.read().is_some()
    }
}

#[async_trait]
impl TaskService for InferenceService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn process_task(&self, task: &Task) -> anyhow::Result<TaskOutcome> {
        let request = match InferenceRequest::from_task(task) {
            Ok(request) => request,
            Err(CommandError::UnsupportedTaskType(task_type)) => {
                warn!(service = %self.name, task_id = %task.id, task_type = %task_type, "Unsupported task type");
                return Ok(TaskOutcome::failure(format!(
                    "Unsupported task type for {}: {task_type}",
                    self.name
                )));
            }
            Err(e) => {
                // Checked before the payload so a missing backend is reported first.
                if !self.has_provider() {
                    return Ok(self.provider_missing(task));
                }
                error!(service = %self.name, task_id = %task.id, error = %e, "No content provided for analysis");
                return Ok(TaskOutcome::failure(
                    "No content provided for analysis in task payload",
                ));
            }
        };

        let Some(provider) = self.provider.read().clone() else {
            return Ok(self.provider_missing(task));
        };

        match request {
            InferenceRequest::AnalyzeContent { content } => match provider.respond(&content).await {
                Ok(result) => {
                    info!(
                        service = %self.name,
                        task_id = %task.id,
                        correlation_id = ?task.correlation_id,
                        "Inference successful"
                    );
                    Ok(TaskOutcome::success_with("result", result))
                }
                Err(e) => {
                    error!(
                        service = %self.name,
                        task_id = %task.id,
                        correlation_id = ?task.correlation_id,
                        error = %e,
                        "Inference failed"
                    );
                    Ok(TaskOutcome::failure(format!("Error during inference: {e}")))
                }
            },
        }
    }
}

impl InferenceService {
    fn provider_missing(&self, task: &Task) -> TaskOutcome {
        error!(service = %self.name, task_id = %task.id, "Inference provider not configured");
        TaskOutcome::failure(format!("Inference provider not configured for {}", self.name))
    }
}

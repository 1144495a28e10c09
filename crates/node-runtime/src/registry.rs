//! # Service Registry
//!
//! The services hosted by this process, started in registration order and
//! stopped in reverse.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               ServiceRegistry                │
//! │                                              │
//! │  ┌─────────────┐ ┌─────────────┐ ┌────────┐  │
//! │  │ EchoService │ │ Inference.. │ │  ...   │  │
//! │  │ echo_tasks  │ │ llm_tasks   │ │        │  │
//! │  └──────┬──────┘ └──────┬──────┘ └────────┘  │
//! │         └───────────────┴──────→ MessageBus  │
//! └──────────────────────────────────────────────┘
//! ```

use parking_lot::RwLock;
use shared_types::ServiceStatus;
use std::sync::Arc;
use tb_01_service_runtime::{RuntimeError, ServiceRuntime};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Channel {channel} is already served by {existing}")]
    ChannelTaken { channel: String, existing: String },

    #[error("{} service(s) failed to start: {}", .0.len(), join(.0))]
    StartFailed(Vec<RuntimeError>),
}

fn join(errors: &[RuntimeError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<Vec<Arc<ServiceRuntime>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service runtime. One service per task channel.
    pub fn register(&self, runtime: ServiceRuntime) -> Result<Arc<ServiceRuntime>, RegistryError> {
        let mut services = self.services.write();
        if let Some(existing) = services
            .iter()
            .find(|s| s.task_channel() == runtime.task_channel())
        {
            return Err(RegistryError::ChannelTaken {
                channel: runtime.task_channel().to_string(),
                existing: existing.service_name().to_string(),
            });
        }

        info!(
            service = %runtime.service_name(),
            channel = %runtime.task_channel(),
            "Registering service"
        );
        let runtime = Arc::new(runtime);
        services.push(runtime.clone());
        Ok(runtime)
    }

    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }

    /// Start every registered service. A failure does not stop the others
    /// from starting.
    pub async fn start_all(&self) -> Result<(), RegistryError> {
        let services = self.services.read().clone();
        let mut errors = Vec::new();

        for service in &services {
            if let Err(e) = service.start().await {
                warn!(service = %service.service_name(), error = %e, "Service failed to start");
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::StartFailed(errors))
        }
    }

    /// Stop every registered service, last registered first.
    pub async fn stop_all(&self) {
        let services = self.services.read().clone();
        for service in services.iter().rev() {
            service.stop().await;
        }
    }

    pub fn statuses(&self) -> Vec<ServiceStatus> {
        self.services.read().iter().map(|s| s.status()).collect()
    }

    /// True when every registered service is running.
    pub fn is_healthy(&self) -> bool {
        self.services.read().iter().all(|s| s.is_running())
    }

    pub fn log_status(&self) {
        for status in self.statuses() {
            info!(
                service = %status.service_name,
                channel = %status.task_channel,
                state = %status.state,
                "Service status"
            );
        }
    }
}

//! # Service Runtime
//!
//! Generic lifecycle around one task channel subscription.
//!
//! ```text
//! Created ──start()──→ Running ──stop()──→ Stopping ──→ Stopped
//! ```
//!
//! After `stop()` returns, the service publishes no further replies: the
//! receive loop has exited and any in-flight task has completed.

use crate::domain::error::RuntimeError;
use crate::ipc::dispatcher::TaskDispatcher;
use crate::ports::inbound::TaskService;
use parking_lot::RwLock;
use shared_bus::{MessageBus, SubscriptionHandle};
use shared_types::{ServiceState, ServiceStatus};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Runs a [`TaskService`] on a task channel.
pub struct ServiceRuntime {
    service: Arc<dyn TaskService>,
    bus: MessageBus,
    task_channel: String,
    state: RwLock<ServiceState>,
    /// Held across start/stop so they never interleave.
    subscription: Mutex<Option<SubscriptionHandle>>,
}

impl ServiceRuntime {
    pub fn new(service: Arc<dyn TaskService>, bus: MessageBus, task_channel: impl Into<String>) -> Self {
        let task_channel = task_channel.into();
        info!(service = %service.name(), channel = %task_channel, "Service initializing");
        Self {
            service,
            bus,
            task_channel,
            state: RwLock::new(ServiceState::Created),
            subscription: Mutex::new(None),
        }
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    pub fn task_channel(&self) -> &str {
        &self.task_channel
    }

    pub fn state(&self) -> ServiceState {
        *self.state.read()
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    pub fn status(&self) -> ServiceStatus {
        let state = self.state();
        ServiceStatus {
            service_name: self.service_name().to_string(),
            task_channel: self.task_channel.clone(),
            state,
            running: state.is_running(),
        }
    }

    /// Subscribe to the task channel and start processing.
    ///
    /// Returns once the subscription is established. Starting a running
    /// service is a no-op; starting a stopped one fails.
    pub async fn start(&self) -> Result<(), RuntimeError> {
        let mut subscription = self.subscription.lock().await;

        match self.state() {
            ServiceState::Running => {
                warn!(service = %self.service_name(), "Service already running");
                return Ok(());
            }
            ServiceState::Stopping | ServiceState::Stopped => {
                return Err(RuntimeError::Terminated {
                    service: self.service_name().to_string(),
                });
            }
            ServiceState::Created => {}
        }

        let dispatcher = Arc::new(TaskDispatcher::new(
            self.service.clone(),
            self.bus.clone(),
            self.task_channel.clone(),
        ));
        let handle = self
            .bus
            .spawn_subscription(&self.task_channel, dispatcher)
            .await
            .map_err(|e| {
                error!(
                    service = %self.service_name(),
                    channel = %self.task_channel,
                    error = %e,
                    "Task subscription failed"
                );
                RuntimeError::from(e)
            })?;

        *subscription = Some(handle);
        *self.state.write() = ServiceState::Running;
        info!(
            service = %self.service_name(),
            channel = %self.task_channel,
            "Service started and listening for tasks"
        );
        Ok(())
    }

    /// Cancel the subscription and wait for it to unwind.
    ///
    /// Idempotent; never fails. A task already being processed completes
    /// (and replies) before this returns.
    pub async fn stop(&self) {
        let mut subscription = self.subscription.lock().await;

        match self.state() {
            ServiceState::Stopped => return,
            ServiceState::Created => {
                *self.state.write() = ServiceState::Stopped;
                return;
            }
            ServiceState::Running | ServiceState::Stopping => {}
        }

        *self.state.write() = ServiceState::Stopping;
        info!(service = %self.service_name(), "Service stopping");

        if let Some(mut handle) = subscription.take() {
            if let Err(e) = handle.stop().await {
                warn!(
                    service = %self.service_name(),
                    error = %e,
                    "Subscription ended with error during shutdown"
                );
            }
        }

        *self.state.write() = ServiceState::Stopped;
        info!(service = %self.service_name(), "Service stopped");
    }
}

//! # Runtime Context
//!
//! The bus handle and configuration, built once at startup and passed by
//! reference to everything that publishes or consumes tasks. There are no
//! process-wide singletons; tests build as many contexts as they need.

use crate::config::NodeConfig;
use shared_bus::{BusError, MessageBus};
use std::sync::Arc;
use tb_01_service_runtime::{ServiceRuntime, TaskService};
use tb_02_request_reply::RequestReplyClient;
use tb_03_retry_executor::RetryExecutor;
use tracing::info;

pub struct RuntimeContext {
    bus: MessageBus,
    config: NodeConfig,
}

impl RuntimeContext {
    /// Connect the bus named by `config.bus_url`.
    pub async fn connect(config: NodeConfig) -> Result<Self, BusError> {
        let bus = MessageBus::connect(&config.bus_url).await?;
        info!(bus_url = %config.bus_url, transport = bus.transport_name(), "Message bus connected");
        Ok(Self { bus, config })
    }

    /// Wrap an existing bus.
    pub fn with_bus(bus: MessageBus, config: NodeConfig) -> Self {
        Self { bus, config }
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Runtime for `service` on `task_channel`, not yet started.
    pub fn service_runtime(&self, service: Arc<dyn TaskService>, task_channel: &str) -> ServiceRuntime {
        ServiceRuntime::new(service, self.bus.clone(), task_channel)
    }

    /// Request/reply client with a private `<role>:<instance>:<uuid>` reply
    /// channel and the configured request timeout.
    pub fn request_client(&self, role: &str, instance: &str) -> RequestReplyClient {
        RequestReplyClient::for_owner(self.bus.clone(), role, instance)
            .with_default_timeout(self.config.request_timeout)
    }

    /// Retry executor using the configured policy.
    pub fn retry_executor(&self, label: &str) -> RetryExecutor {
        RetryExecutor::new(self.config.retry).labeled(label)
    }

    /// Close the bus. Running subscriptions end.
    pub async fn shutdown(&self) -> Result<(), BusError> {
        self.bus.close().await
    }
}

//! # TaskBus Node Runtime
//!
//! Hosts TaskBus services on one message bus.
//!
//! ## Startup Sequence
//!
//! 1. Install logging (`TB_LOG_LEVEL`, `TB_JSON_LOGS`, ...)
//! 2. Load and validate `NodeConfig` from the environment
//! 3. Connect the bus named by `TB_BUS_URL`
//! 4. Register and start services
//! 5. Run until Ctrl-C, then stop services and close the bus

use std::sync::Arc;

use anyhow::{Context, Result};
use node_runtime::{echo_service, NodeConfig, RuntimeContext, ServiceRegistry};
use taskbus_telemetry::{init_telemetry, TelemetryConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::for_service("node-runtime"))
        .context("Failed to initialize logging")?;

    let config = NodeConfig::from_env().context("Invalid configuration")?;
    let context = RuntimeContext::connect(config)
        .await
        .context("Failed to connect message bus")?;

    let registry = ServiceRegistry::new();
    registry.register(context.service_runtime(
        Arc::new(echo_service()?),
        &context.config().echo_task_channel,
    ))?;

    info!("===========================================");
    info!("  TaskBus Node Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("  Transport: {}", context.bus().transport_name());
    info!("===========================================");

    registry.start_all().await?;
    registry.log_status();

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    info!("Initiating graceful shutdown...");
    registry.stop_all().await;
    if let Err(e) = context.shutdown().await {
        error!(error = %e, "Failed to close message bus");
    }
    info!("Shutdown complete");

    Ok(())
}

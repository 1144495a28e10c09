//! # Node Runtime Library
//!
//! Process-level wiring for TaskBus: configuration, the explicit runtime
//! context, the service registry and the built-in echo service. The binary
//! in `main.rs` is a thin shell over these.

pub mod config;
pub mod context;
pub mod echo;
pub mod registry;

pub use config::{ConfigError, NodeConfig};
pub use context::RuntimeContext;
pub use echo::{echo_service, ECHO, ECHO_SERVICE_NAME};
pub use registry::{RegistryError, ServiceRegistry};

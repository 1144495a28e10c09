//! # Shared Types Crate
//!
//! Wire-level types exchanged over the task bus.
//!
//! ## Design Principles
//!
//! - **One schema for every worker**: tasks and replies look the same whether
//!   the consumer is an inference worker, a browser worker or a test double.
//! - **Open maps only at the edge**: payloads stay `serde_json` objects on the
//!   wire; typed payloads live in the worker crates.
//! - **Request/reply is opt-in**: a task carries either both `correlation_id`
//!   and `reply_to_channel`, or neither.
//!
//! ## Message Flow
//!
//! ```text
//! Client ──Task{correlation_id, reply_to_channel}──→ task channel
//!                                                        │
//!                                                   Service Runtime
//!                                                        │
//! Client ←──ReplyEnvelope{correlation_id, data}── reply channel
//! ```

pub mod channels;
pub mod commands;
pub mod envelope;
pub mod errors;
pub mod lifecycle;
pub mod task;

pub use channels::ReplyChannel;
pub use commands::{CommandError, TaskCommand};
pub use envelope::{ReplyEnvelope, TaskOutcome};
pub use errors::EnvelopeError;
pub use lifecycle::{ServiceState, ServiceStatus};
pub use task::{new_correlation_id, new_task_id, ReplyRoute, Task, TaskPayload, DEFAULT_PRIORITY};

/// Structured message as carried by the bus: a JSON object.
pub type BusMessage = serde_json::Map<String, serde_json::Value>;

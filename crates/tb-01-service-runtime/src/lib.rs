//! # TB-01 Service Runtime
//!
//! Generic task consumer: one subscription per service on a well-known task
//! channel, one task at a time in arrival order.
//!
//! ## Architecture
//!
//! ```text
//!          task channel
//!               │
//!    ┌──────────▼───────────┐
//!    │    ServiceRuntime    │  start / stop / status
//!    │  ┌────────────────┐  │
//!    │  │ TaskDispatcher │  │  validate → Task → process → reply
//!    │  └───────┬────────┘  │
//!    └──────────┼───────────┘
//!               ▼
//!        dyn TaskService  (TaskRouter or a hand-written service)
//! ```
//!
//! ## Reply Contract
//!
//! | Task carries | Outcome |
//! |--------------|---------|
//! | `correlation_id` + `reply_to_channel` | exactly one `ReplyEnvelope` |
//! | neither | no reply |
//! | only one of them | processed, no reply, warning logged |
//! | missing `id`/`type`/`payload` | dropped, error logged |
//!
//! Handler errors and panics produce
//! `{success: false, error: "<service> failed to process task: <error>"}`.

pub mod domain;
pub mod ipc;
pub mod ports;
pub mod service;

pub use domain::{handler_fn, FnHandler, RuntimeError, TaskHandler, TaskRouter, TaskRouterBuilder};
pub use ipc::TaskDispatcher;
pub use ports::TaskService;
pub use service::ServiceRuntime;

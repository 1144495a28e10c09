//! Domain types for the service runtime.

pub mod error;
pub mod router;

pub use error::RuntimeError;
pub use router::{handler_fn, FnHandler, TaskHandler, TaskRouter, TaskRouterBuilder};

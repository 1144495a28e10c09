//! Domain types for the request/reply client.
//!
//! Async infrastructure (the listener) lives in `ipc`.

pub mod error;
pub mod pending;

pub use error::{PendingError, RequestError};
pub use pending::{PendingRequestStore, PendingStats};

//! # TB-03 Retry Executor
//!
//! Bounded retries with exponential backoff around any fallible operation,
//! including whole request/reply round trips.
//!
//! ```text
//! attempt 0 ──fail──→ sleep base ──→ attempt 1 ──fail──→ sleep 2·base ──→ …
//!                                                   attempt max_retries ──fail──→ Err(last)
//! ```
//!
//! Parameters are validated when the [`RetryPolicy`] is built.

pub mod executor;
pub mod policy;

pub use executor::RetryExecutor;
pub use policy::{RetryConfigError, RetryPolicy};

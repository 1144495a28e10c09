//! # TaskBus Test Suite
//!
//! Cross-crate flows run against the in-memory bus.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs          # Test services and helpers
//!     ├── request_reply.rs     # Round trips, timeouts, correlation
//!     ├── service_lifecycle.rs # Start/stop, in-flight tasks
//!     ├── retry.rs             # Retry executor around round trips
//!     ├── malformed.rs         # Bad messages on task channels
//!     └── workers.rs           # Inference and browser workers end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tb-tests
//! cargo test -p tb-tests integration::retry::
//! ```

pub mod integration;

//! Cross-crate integration flows.

pub mod fixtures;
pub mod malformed;
pub mod request_reply;
pub mod retry;
pub mod service_lifecycle;
pub mod workers;

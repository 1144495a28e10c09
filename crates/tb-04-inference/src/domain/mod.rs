//! Domain types for the inference worker.

pub mod commands;

pub use commands::{InferenceRequest, ANALYZE_CONTENT};

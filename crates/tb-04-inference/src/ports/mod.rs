//! Ports for the inference worker.

pub mod outbound;

pub use outbound::InferenceProvider;

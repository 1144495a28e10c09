//! # Error Types
//!
//! Errors raised while decoding or interpreting envelopes.

use thiserror::Error;

/// Errors produced when a bus message cannot be turned into an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// A mandatory field is absent.
    #[error("Missing mandatory field: {0}")]
    MissingField(&'static str),

    /// A field is present but has the wrong shape.
    #[error("Invalid envelope: {0}")]
    InvalidField(String),

    /// Only one of `correlation_id` / `reply_to_channel` is set.
    #[error("Incomplete reply route: {missing} is missing")]
    IncompleteReplyRoute { missing: &'static str },
}

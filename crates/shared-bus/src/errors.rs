//! # Bus Errors

use thiserror::Error;

/// Errors from bus operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// The message could not be encoded; nothing was sent.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The transport is unreachable or broken.
    #[error("Transport error: {0}")]
    Transport(String),

    /// An inbound message could not be decoded into a structured message.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The bus was closed.
    #[error("Message bus closed")]
    Closed,
}

impl BusError {
    /// Returns true if the error ends a receive loop.
    ///
    /// A malformed inbound message only costs that message.
    pub fn is_fatal_to_subscription(&self) -> bool {
        !matches!(self, Self::Decode(_))
    }
}

#[cfg(feature = "redis")]
impl From<::redis::RedisError> for BusError {
    fn from(e: ::redis::RedisError) -> Self {
        Self::Transport(e.to_string())
    }
}

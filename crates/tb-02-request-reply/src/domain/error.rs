//! Request/reply error types.

use shared_bus::BusError;
use thiserror::Error;

/// Errors from the pending request table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PendingError {
    /// A request with this correlation id is already outstanding.
    #[error("Correlation id already pending: {0}")]
    DuplicateCorrelationId(String),
}

/// Errors surfaced to the caller of a request/reply round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// No reply within the caller's deadline.
    #[error("Request {correlation_id} to {channel} timed out after {timeout_ms}ms")]
    Timeout {
        correlation_id: String,
        channel: String,
        timeout_ms: u64,
    },

    /// The service replied with `success: false`.
    #[error("{0}")]
    Remote(String),

    /// Publishing the task or subscribing the reply channel failed.
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    /// The caller reused a correlation id that is still outstanding.
    #[error("Duplicate correlation id: {0}")]
    DuplicateCorrelationId(String),

    /// The reply listener was stopped while the request was waiting.
    #[error("Reply listener stopped before a reply for {0} arrived")]
    ListenerClosed(String),

    /// A successful reply lacked the fields the caller expected.
    #[error("Malformed reply: {0}")]
    MalformedReply(String),
}

impl RequestError {
    /// Returns true for failures worth retrying: timeouts and transport
    /// failures. Remote failures are answers, not outages.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Bus(BusError::Transport(_))
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<PendingError> for RequestError {
    fn from(e: PendingError) -> Self {
        match e {
            PendingError::DuplicateCorrelationId(id) => Self::DuplicateCorrelationId(id),
        }
    }
}

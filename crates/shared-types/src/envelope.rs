//! # Reply Envelope
//!
//! Published by a service on the requester's reply channel.
//!
//! ```text
//! { "correlation_id": string,
//!   "data": { "success": boolean, "error": string?, <other keys>... } }
//! ```
//!
//! `data.success` is the authoritative outcome; `error` is present only on
//! failure. Remote exceptions and business failures look the same to the
//! caller.

use crate::errors::EnvelopeError;
use crate::BusMessage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of processing one task, carried as the reply's `data` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// Authoritative success flag.
    pub success: bool,

    /// Failure reason, only populated when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Opaque payload returned to the caller.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TaskOutcome {
    /// Successful outcome carrying `fields`.
    pub fn success(fields: Map<String, Value>) -> Self {
        Self {
            success: true,
            error: None,
            fields,
        }
    }

    /// Successful outcome with a single payload field.
    pub fn success_with(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut fields = Map::new();
        fields.insert(key.into(), value.into());
        Self::success(fields)
    }

    /// Failed outcome with a reason.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            fields: Map::new(),
        }
    }

    /// Split into the payload fields on success or the error on failure.
    ///
    /// A failure without a reason yields `Err(None)`.
    pub fn into_result(self) -> Result<Map<String, Value>, Option<String>> {
        if self.success {
            Ok(self.fields)
        } else {
            Err(self.error)
        }
    }
}

/// Reply to a request task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    /// Correlation id copied from the request.
    pub correlation_id: String,
    /// Processing outcome.
    pub data: TaskOutcome,
}

impl ReplyEnvelope {
    /// Create a reply for `correlation_id`.
    pub fn new(correlation_id: impl Into<String>, data: TaskOutcome) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            data,
        }
    }

    /// Decode a reply from a bus message.
    pub fn from_message(message: BusMessage) -> Result<Self, EnvelopeError> {
        if !message.contains_key("correlation_id") {
            return Err(EnvelopeError::MissingField("correlation_id"));
        }
        if !message.contains_key("data") {
            return Err(EnvelopeError::MissingField("data"));
        }

        serde_json::from_value(Value::Object(message))
            .map_err(|e| EnvelopeError::InvalidField(e.to_string()))
    }
}

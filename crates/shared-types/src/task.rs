//! # Task Envelope
//!
//! The unit of work published on a service's task channel.
//!
//! ```text
//! { "id": string, "type": string, "payload": object,
//!   "priority": integer,            // optional, default 1
//!   "correlation_id": string|null,
//!   "reply_to_channel": string|null }
//! ```

use crate::errors::EnvelopeError;
use crate::BusMessage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-form task payload as it travels on the wire.
pub type TaskPayload = serde_json::Map<String, serde_json::Value>;

/// Priority assigned when the producer does not set one.
pub const DEFAULT_PRIORITY: i64 = 1;

/// Fields every task must carry before it can be reconstructed.
const MANDATORY_FIELDS: [&str; 3] = ["id", "type", "payload"];

fn default_priority() -> i64 {
    DEFAULT_PRIORITY
}

/// Generate a fresh task identifier.
pub fn new_task_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a fresh correlation identifier.
pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// A unit of work.
///
/// `id` identifies the task itself (logging, idempotence tracking);
/// `correlation_id` identifies the request a reply belongs to. The two are
/// independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier.
    pub id: String,

    /// Task type tag used for dispatch (e.g. `analyze_content`).
    #[serde(rename = "type")]
    pub task_type: String,

    /// Opaque payload interpreted by the handler for `task_type`.
    pub payload: TaskPayload,

    /// Scheduling hint; informational for the default runtime.
    #[serde(default = "default_priority")]
    pub priority: i64,

    /// Request identifier for reply matching.
    #[serde(default)]
    pub correlation_id: Option<String>,

    /// Channel the reply must be published to.
    #[serde(default)]
    pub reply_to_channel: Option<String>,
}

/// Where and under which correlation id a reply must be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRoute {
    /// Correlation id copied into the reply envelope.
    pub correlation_id: String,
    /// Channel the reply envelope is published to.
    pub channel: String,
}

impl Task {
    /// Create a fire-and-forget task (no reply requested).
    pub fn fire_and_forget(task_type: impl Into<String>, payload: TaskPayload) -> Self {
        Self {
            id: new_task_id(),
            task_type: task_type.into(),
            payload,
            priority: DEFAULT_PRIORITY,
            correlation_id: None,
            reply_to_channel: None,
        }
    }

    /// Create a request task with a fresh correlation id and the given reply channel.
    pub fn request(
        task_type: impl Into<String>,
        payload: TaskPayload,
        reply_to_channel: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id: Some(new_correlation_id()),
            reply_to_channel: Some(reply_to_channel.into()),
            ..Self::fire_and_forget(task_type, payload)
        }
    }

    /// Replace the correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Returns true if this task requests a reply.
    pub fn expects_reply(&self) -> bool {
        self.correlation_id.is_some() && self.reply_to_channel.is_some()
    }

    /// Resolve the reply route.
    ///
    /// `Ok(None)` for fire-and-forget tasks; an error when exactly one of
    /// `correlation_id` / `reply_to_channel` is present.
    pub fn reply_route(&self) -> Result<Option<ReplyRoute>, EnvelopeError> {
        match (&self.correlation_id, &self.reply_to_channel) {
            (Some(correlation_id), Some(channel)) => Ok(Some(ReplyRoute {
                correlation_id: correlation_id.clone(),
                channel: channel.clone(),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(EnvelopeError::IncompleteReplyRoute {
                missing: "reply_to_channel",
            }),
            (None, Some(_)) => Err(EnvelopeError::IncompleteReplyRoute {
                missing: "correlation_id",
            }),
        }
    }

    /// Reconstruct a task from a decoded bus message.
    ///
    /// The message must carry `id`, `type` and `payload`; `payload` must be an
    /// object.
    pub fn from_message(message: BusMessage) -> Result<Self, EnvelopeError> {
        if let Some(field) = MANDATORY_FIELDS
            .iter()
            .find(|field| !message.contains_key(**field))
        {
            return Err(EnvelopeError::MissingField(*field));
        }

        serde_json::from_value(serde_json::Value::Object(message))
            .map_err(|e| EnvelopeError::InvalidField(e.to_string()))
    }
}

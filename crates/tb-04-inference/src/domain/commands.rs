//! Inference task types and payloads.
//!
//! | Task type | Payload | Reply data |
//! |-----------|---------|------------|
//! | `analyze_content` | `{content: string}` | `{result: string}` |

use shared_types::commands::required_str;
use shared_types::{CommandError, TaskCommand, TaskPayload};

pub const ANALYZE_CONTENT: &str = "analyze_content";

/// Requests understood by the inference worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceRequest {
    /// Run the model over `content` (the full prompt).
    AnalyzeContent { content: String },
}

impl TaskCommand for InferenceRequest {
    fn task_type(&self) -> &'static str {
        match self {
            Self::AnalyzeContent { .. } => ANALYZE_CONTENT,
        }
    }

    fn to_payload(&self) -> TaskPayload {
        let mut payload = TaskPayload::new();
        match self {
            Self::AnalyzeContent { content } => {
                payload.insert("content".into(), content.clone().into());
            }
        }
        payload
    }

    fn parse(task_type: &str, payload: &TaskPayload) -> Result<Self, CommandError> {
        match task_type {
            ANALYZE_CONTENT => Ok(Self::AnalyzeContent {
                content: required_str(payload, task_type, "content")?,
            }),
            other => Err(CommandError::UnsupportedTaskType(other.to_string())),
        }
    }
}

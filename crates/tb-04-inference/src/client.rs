//! Typed caller for the inference worker.

use crate::domain::commands::InferenceRequest;
use serde_json::Value;
use shared_types::channels::LLM_TASKS;
use shared_types::TaskCommand;
use std::sync::Arc;
use std::time::Duration;
use tb_02_request_reply::{RequestError, RequestReplyClient};

pub struct InferenceClient {
    client: Arc<RequestReplyClient>,
    channel: String,
    timeout: Duration,
}

impl InferenceClient {
    /// Client targeting the default `llm_tasks` channel.
    pub fn new(client: Arc<RequestReplyClient>) -> Self {
        let timeout = client.default_timeout();
        Self {
            client,
            channel: LLM_TASKS.to_string(),
            timeout,
        }
    }

    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Run the model over `content` and return its text.
    pub async fn analyze(&self, content: impl Into<String>) -> Result<String, RequestError> {
        let request = InferenceRequest::AnalyzeContent {
            content: content.into(),
        };
        let fields = self
            .client
            .send(&self.channel, request.task_type(), request.to_payload(), self.timeout)
            .await?;

        match fields.get("result") {
            Some(Value::String(result)) => Ok(result.clone()),
            Some(other) => Err(RequestError::MalformedReply(format!(
                "expected string result, got {other}"
            ))),
            None => Err(RequestError::MalformedReply(
                "inference reply has no result".into(),
            )),
        }
    }
}

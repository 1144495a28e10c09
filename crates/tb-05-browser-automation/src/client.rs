//! Typed caller for the browser automation worker.
//!
//! Each method sends one `browser_*` task and returns the reply's `data`
//! object.

use crate::domain::commands::BrowserCommand;
use serde_json::Value;
use shared_types::channels::BROWSER_TASKS;
use shared_types::{TaskCommand, TaskPayload};
use std::sync::Arc;
use std::time::Duration;
use tb_02_request_reply::{RequestError, RequestReplyClient};

pub struct BrowserClient {
    client: Arc<RequestReplyClient>,
    channel: String,
    timeout: Duration,
}

impl BrowserClient {
    /// Client targeting the default `browser_tasks` channel.
    pub fn new(client: Arc<RequestReplyClient>) -> Self {
        let timeout = client.default_timeout();
        Self {
            client,
            channel: BROWSER_TASKS.to_string(),
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

    /// Send any command and return its `data` object.
    pub async fn execute(&self, command: BrowserCommand) -> Result<TaskPayload, RequestError> {
        let task_type = command.task_type();
        let mut fields = self
            .client
            .send(&self.channel, task_type, command.to_payload(), self.timeout)
            .await?;

        match fields.remove("data") {
            Some(Value::Object(data)) => Ok(data),
            Some(other) => Err(RequestError::MalformedReply(format!(
                "{task_type} reply data is not an object: {other}"
            ))),
            None => Err(RequestError::MalformedReply(format!(
                "{task_type} reply has no data"
            ))),
        }
    }

    pub async fn navigate(&self, url: impl Into<String>) -> Result<TaskPayload, RequestError> {
        self.execute(BrowserCommand::Navigate { url: url.into() }).await
    }

    pub async fn get_text(&self) -> Result<TaskPayload, RequestError> {
        self.execute(BrowserCommand::GetText).await
    }

    pub async fn click_element(&self, selector: impl Into<String>) -> Result<TaskPayload, RequestError> {
        self.execute(BrowserCommand::ClickElement {
            selector: selector.into(),
        })
        .await
    }

    pub async fn fill_form(&self, input_list: Vec<String>) -> Result<TaskPayload, RequestError> {
        self.execute(BrowserCommand::FillForm { input_list }).await
    }

    pub async fn get_navigable_links(&self) -> Result<TaskPayload, RequestError> {
        self.execute(BrowserCommand::GetNavigableLinks).await
    }

    pub async fn screenshot(&self, path: Option<String>) -> Result<TaskPayload, RequestError> {
        self.execute(BrowserCommand::Screenshot { path }).await
    }

    pub async fn get_current_url(&self) -> Result<TaskPayload, RequestError> {
        self.execute(BrowserCommand::GetCurrentUrl).await
    }

    pub async fn go_back(&self) -> Result<TaskPayload, RequestError> {
        self.execute(BrowserCommand::GoBack).await
    }

    pub async fn get_form_inputs(&self) -> Result<TaskPayload, RequestError> {
        self.execute(BrowserCommand::GetFormInputs).await
    }
}

//! Outbound port: the model backend.

use async_trait::async_trait;

/// A language-model backend. Prompting strategy and transport are the
/// provider's business.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Short description for logs.
    fn describe(&self) -> String;

    /// Produce a response for `prompt`.
    async fn respond(&self, prompt: &str) -> anyhow::Result<String>;
}

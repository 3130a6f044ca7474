use async_trait::async_trait;

/// A text-in, text-out language model.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Model identifier (e.g. "gemini-1.5-flash-latest").
    fn id(&self) -> &str;

    /// Send a single user prompt and return the model's text.
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

use anyhow::Result;
use async_trait::async_trait;

/// Seam for the hosted model runtime. The runtime itself is an external
/// collaborator; this crate only consumes completions.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Client used when no model provider is configured. Returns an empty
/// completion so callers take their deterministic fallback path.
#[derive(Default)]
pub struct NoopLlmClient;

#[async_trait]
impl LlmClient for NoopLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(String::new())
    }
}

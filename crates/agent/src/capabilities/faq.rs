use std::sync::Arc;

use async_trait::async_trait;
use glidedesk_core::{AgentResponse, CapabilityName, SupportRequest};
use serde_json::Map;
use tracing::warn;

use super::CapabilityAgent;
use crate::llm::LlmClient;
use crate::tools::retrieval::DocumentIndex;

const FAQ_INSTRUCTIONS: &str = "You are a helpful FAQ agent for GlideLogistics packaging \
questions. Answer using only the provided guideline excerpts. Be clear and concise.";

/// Answers packaging questions from the guidelines corpus. When a model
/// client is configured it phrases the answer over the retrieved snippets;
/// otherwise (or on model failure) a deterministic template is used.
pub struct FaqAgent {
    index: Arc<DocumentIndex>,
    llm: Arc<dyn LlmClient>,
}

impl FaqAgent {
    pub fn new(index: Arc<DocumentIndex>, llm: Arc<dyn LlmClient>) -> Self {
        Self { index, llm }
    }

    fn build_prompt(question: &str, snippets: &[crate::tools::DocumentSnippet]) -> String {
        let mut prompt = String::from(FAQ_INSTRUCTIONS);
        prompt.push_str("\n\nGuideline excerpts:\n");
        for snippet in snippets {
            prompt.push_str("- ");
            prompt.push_str(&snippet.text);
            prompt.push('\n');
        }
        prompt.push_str("\nQuestion: ");
        prompt.push_str(question);
        prompt
    }
}

#[async_trait]
impl CapabilityAgent for FaqAgent {
    fn name(&self) -> CapabilityName {
        CapabilityName::Faq
    }

    async fn handle(&self, request: &SupportRequest) -> AgentResponse {
        let question = request.text.clone().unwrap_or_else(|| "general help".to_string());
        let snippets = self.index.query(&question);

        let mut text = format!("FAQ: Answering '{question}'");
        if !snippets.is_empty() {
            match self.llm.complete(&Self::build_prompt(&question, &snippets)).await {
                Ok(completion) if !completion.trim().is_empty() => text = completion,
                Ok(_) => {}
                Err(error) => {
                    warn!(
                        event_name = "capability.faq.llm_failed",
                        user_id = %request.user_id,
                        error = %error,
                        "model completion failed, using template answer"
                    );
                }
            }
        }

        let mut response = AgentResponse::text_only(self.name().agent_label(), text);
        if !snippets.is_empty() {
            let mut data = Map::new();
            data.insert(
                "sources".to_string(),
                serde_json::to_value(&snippets).unwrap_or_default(),
            );
            response = response.with_data(data);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;
    use glidedesk_core::SupportRequest;

    use super::FaqAgent;
    use crate::capabilities::CapabilityAgent;
    use crate::llm::{LlmClient, NoopLlmClient};
    use crate::tools::retrieval::DocumentIndex;

    struct ScriptedLlm(&'static str);

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            anyhow::bail!("model unavailable")
        }
    }

    #[tokio::test]
    async fn noop_model_yields_the_template_answer() {
        let agent =
            FaqAgent::new(Arc::new(DocumentIndex::builtin()), Arc::new(NoopLlmClient));
        let response =
            agent.handle(&SupportRequest::with_text("u1", "what box sizes exist?")).await;

        assert_eq!(response.agent, "FAQAgent");
        assert_eq!(response.text, "FAQ: Answering 'what box sizes exist?'");
        let data = response.data.expect("retrieval data");
        assert!(!data["sources"].as_array().expect("sources").is_empty());
    }

    #[tokio::test]
    async fn configured_model_phrases_the_answer() {
        let agent = FaqAgent::new(
            Arc::new(DocumentIndex::builtin()),
            Arc::new(ScriptedLlm("Use a rigid corrugated box with cushioning.")),
        );
        let response = agent.handle(&SupportRequest::with_text("u1", "which box?")).await;
        assert_eq!(response.text, "Use a rigid corrugated box with cushioning.");
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_template() {
        let agent = FaqAgent::new(Arc::new(DocumentIndex::builtin()), Arc::new(FailingLlm));
        let response = agent.handle(&SupportRequest::with_text("u1", "which box?")).await;
        assert_eq!(response.text, "FAQ: Answering 'which box?'");
    }

    #[tokio::test]
    async fn unmatched_question_answers_without_sources() {
        let agent =
            FaqAgent::new(Arc::new(DocumentIndex::builtin()), Arc::new(NoopLlmClient));
        let response = agent.handle(&SupportRequest::with_text("u1", "hello there")).await;
        assert_eq!(response.text, "FAQ: Answering 'hello there'");
        assert_eq!(response.data, None);
    }
}

use async_trait::async_trait;
use glidedesk_core::{AgentResponse, CapabilityName, SupportRequest};

use super::CapabilityAgent;

#[derive(Default)]
pub struct OnboardingAgent;

#[async_trait]
impl CapabilityAgent for OnboardingAgent {
    fn name(&self) -> CapabilityName {
        CapabilityName::Onboarding
    }

    async fn handle(&self, _request: &SupportRequest) -> AgentResponse {
        AgentResponse::text_only(
            self.name().agent_label(),
            "Onboarding: Please provide your information.",
        )
    }
}

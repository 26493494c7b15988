pub mod booking;
pub mod faq;
pub mod id_validation;
pub mod onboarding;
pub mod tracking;

use async_trait::async_trait;
use glidedesk_core::{AgentResponse, CapabilityName, SupportRequest, ToolError};
use serde_json::Map;

pub use booking::BookingAgent;
pub use faq::FaqAgent;
pub use id_validation::IdValidationAgent;
pub use onboarding::OnboardingAgent;
pub use tracking::TrackingAgent;

/// The uniform capability seam.
///
/// `handle` cannot fail: tool and model faults are converted to well-formed
/// responses (user-safe `text`, raw error under `data.error`) before they
/// leave the agent, so the orchestrator never sees an unhandled fault.
#[async_trait]
pub trait CapabilityAgent: Send + Sync {
    fn name(&self) -> CapabilityName;

    async fn handle(&self, request: &SupportRequest) -> AgentResponse;
}

/// `data` payload carrying a tool error for observability.
pub(crate) fn error_data(error: &ToolError) -> Map<String, serde_json::Value> {
    let mut data = Map::new();
    data.insert("error".to_string(), error.as_wire_value());
    data
}

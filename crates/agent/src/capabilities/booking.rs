use async_trait::async_trait;
use glidedesk_core::{AgentResponse, CapabilityName, SupportRequest};

use super::CapabilityAgent;

/// First-turn booking prompt. Actual booking creation goes through the
/// `create_booking` tool once the caller has gathered every field.
#[derive(Default)]
pub struct BookingAgent;

#[async_trait]
impl CapabilityAgent for BookingAgent {
    fn name(&self) -> CapabilityName {
        CapabilityName::Booking
    }

    async fn handle(&self, _request: &SupportRequest) -> AgentResponse {
        AgentResponse::text_only(
            self.name().agent_label(),
            "Booking: Please provide booking details.",
        )
    }
}

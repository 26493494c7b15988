use std::sync::Arc;

use async_trait::async_trait;
use glidedesk_core::{AgentResponse, CapabilityName, SupportRequest, ToolError};
use serde_json::Map;
use tracing::warn;

use super::{error_data, CapabilityAgent};
use crate::tools::tracking::{TrackShipmentTool, TrackingRecord};

/// Looks up shipment status when the utterance carries a tracking number,
/// and prompts for one otherwise.
pub struct TrackingAgent {
    tool: Arc<TrackShipmentTool>,
}

impl TrackingAgent {
    pub fn new(tool: Arc<TrackShipmentTool>) -> Self {
        Self { tool }
    }
}

/// First run of exactly nine consecutive digits, if any.
fn find_tracking_number(text: &str) -> Option<String> {
    let mut run = String::new();
    for character in text.chars().chain(std::iter::once(' ')) {
        if character.is_ascii_digit() {
            run.push(character);
            continue;
        }
        if run.len() == 9 {
            return Some(run);
        }
        run.clear();
    }
    None
}

fn format_record(tracking_number: &str, record: &TrackingRecord) -> String {
    match (record.status.as_str(), &record.delivery_date, &record.hub_depart_date) {
        ("delivered", Some(delivery_date), _) => {
            format!("Shipment {tracking_number} was delivered on {delivery_date}.")
        }
        ("depart_hub", _, Some(hub_depart_date)) => {
            format!("Shipment {tracking_number} departed our hub on {hub_depart_date}.")
        }
        (status, _, _) => format!("Shipment {tracking_number} status: {status}."),
    }
}

#[async_trait]
impl CapabilityAgent for TrackingAgent {
    fn name(&self) -> CapabilityName {
        CapabilityName::Tracking
    }

    async fn handle(&self, request: &SupportRequest) -> AgentResponse {
        let agent_label = self.name().agent_label();
        let utterance = request.text.as_deref().unwrap_or("");

        let Some(tracking_number) = find_tracking_number(utterance) else {
            return AgentResponse::text_only(
                agent_label,
                "Tracking: Please provide your tracking number.",
            );
        };

        match self.tool.lookup(&tracking_number) {
            Ok(record) => {
                let mut data = Map::new();
                data.insert("tracking_number".to_string(), tracking_number.clone().into());
                data.insert(
                    "tracking".to_string(),
                    serde_json::to_value(&record).unwrap_or_default(),
                );
                AgentResponse::text_only(agent_label, format_record(&tracking_number, &record))
                    .with_data(data)
            }
            Err(error @ ToolError::NotFound { .. }) => AgentResponse::text_only(
                agent_label,
                format!(
                    "No shipment found for tracking number {tracking_number}. \
                     Please double-check the number and try again."
                ),
            )
            .with_data(error_data(&error)),
            Err(error) => {
                warn!(
                    event_name = "capability.tracking.lookup_failed",
                    user_id = %request.user_id,
                    error = %error,
                    "tracking lookup failed"
                );
                AgentResponse::text_only(
                    agent_label,
                    "Tracking is temporarily unavailable. Please try again shortly.",
                )
                .with_data(error_data(&error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glidedesk_core::SupportRequest;

    use super::{find_tracking_number, TrackingAgent};
    use crate::capabilities::CapabilityAgent;
    use crate::tools::tracking::TrackShipmentTool;

    fn agent() -> TrackingAgent {
        TrackingAgent::new(Arc::new(TrackShipmentTool::seeded()))
    }

    #[test]
    fn finds_nine_digit_runs_only() {
        assert_eq!(find_tracking_number("track 123456789 please"), Some("123456789".to_string()));
        assert_eq!(find_tracking_number("number:987654321."), Some("987654321".to_string()));
        assert_eq!(find_tracking_number("track my package"), None);
        assert_eq!(find_tracking_number("order 1234567890 shipped"), None);
        assert_eq!(find_tracking_number("12345678"), None);
    }

    #[tokio::test]
    async fn prompts_when_no_number_is_present() {
        let response = agent().handle(&SupportRequest::with_text("u1", "track my package")).await;
        assert_eq!(response.agent, "TrackingAgent");
        assert_eq!(response.text, "Tracking: Please provide your tracking number.");
    }

    #[tokio::test]
    async fn formats_delivered_shipment() {
        let response =
            agent().handle(&SupportRequest::with_text("u1", "track 123456789")).await;
        assert_eq!(response.text, "Shipment 123456789 was delivered on 11-June-2025.");
        let data = response.data.expect("record data");
        assert_eq!(data["tracking"]["status"], "delivered");
    }

    #[tokio::test]
    async fn unknown_number_gets_a_user_safe_not_found() {
        let response =
            agent().handle(&SupportRequest::with_text("u1", "track 555555555")).await;
        assert!(response.text.contains("No shipment found for tracking number 555555555"));
        let data = response.data.expect("error data");
        assert_eq!(data["error"]["kind"], "not_found");
    }
}

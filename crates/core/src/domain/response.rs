use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Advisory hint that the caller should expect a follow-up turn. The core
/// passes it through unchanged; nothing server-side enforces it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    AwaitConfirmation,
    AwaitFileUpload,
}

impl NextAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitConfirmation => "await_confirmation",
            Self::AwaitFileUpload => "await_file_upload",
        }
    }
}

/// The uniform reply every capability agent produces. `agent` carries the
/// wire label (`BookingAgent`, ...), not the snake_case capability name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<NextAction>,
}

impl AgentResponse {
    pub fn text_only(agent: impl Into<String>, text: impl Into<String>) -> Self {
        Self { agent: agent.into(), text: text.into(), data: None, next_action: None }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_next_action(mut self, next_action: NextAction) -> Self {
        self.next_action = Some(next_action);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::{AgentResponse, NextAction};

    #[test]
    fn serializes_without_optional_fields() {
        let response =
            AgentResponse::text_only("BookingAgent", "Booking: Please provide booking details.");
        let wire = serde_json::to_value(&response).expect("serializable");
        assert_eq!(
            wire,
            json!({"agent": "BookingAgent", "text": "Booking: Please provide booking details."})
        );
    }

    #[test]
    fn wire_round_trip_is_field_for_field() {
        let mut data = Map::new();
        data.insert("extracted_pan".to_string(), json!({"pan_number": "ABCDE1234F"}));
        let response = AgentResponse::text_only("IDValidationAgent", "Is this correct?")
            .with_data(data)
            .with_next_action(NextAction::AwaitConfirmation);

        let wire = serde_json::to_string(&response).expect("serializable");
        let parsed: AgentResponse = serde_json::from_str(&wire).expect("parseable");
        assert_eq!(parsed, response);
    }

    #[test]
    fn next_action_uses_snake_case_wire_values() {
        let wire: Value =
            serde_json::to_value(NextAction::AwaitFileUpload).expect("serializable");
        assert_eq!(wire, json!("await_file_upload"));
        assert_eq!(NextAction::AwaitConfirmation.as_str(), "await_confirmation");
    }
}

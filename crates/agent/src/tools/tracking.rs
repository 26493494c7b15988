use std::collections::HashMap;

use async_trait::async_trait;
use glidedesk_core::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Tool;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub_depart_date: Option<String>,
}

impl TrackingRecord {
    pub fn delivered(delivery_date: &str) -> Self {
        Self {
            status: "delivered".to_string(),
            delivery_date: Some(delivery_date.to_string()),
            hub_depart_date: None,
        }
    }

    pub fn departed_hub(hub_depart_date: &str) -> Self {
        Self {
            status: "depart_hub".to_string(),
            delivery_date: None,
            hub_depart_date: Some(hub_depart_date.to_string()),
        }
    }
}

/// Looks up shipment status by 9-digit tracking number. Idempotent.
pub struct TrackShipmentTool {
    records: HashMap<String, TrackingRecord>,
}

impl TrackShipmentTool {
    pub fn with_records(records: HashMap<String, TrackingRecord>) -> Self {
        Self { records }
    }

    /// The demo dataset carried by the tracking backend.
    pub fn seeded() -> Self {
        let mut records = HashMap::new();
        records.insert("123456789".to_string(), TrackingRecord::delivered("11-June-2025"));
        records.insert("987654321".to_string(), TrackingRecord::delivered("12-June-2025"));
        records.insert("123459876".to_string(), TrackingRecord::departed_hub("09-June-2025"));
        Self { records }
    }

    pub fn lookup(&self, tracking_number: &str) -> Result<TrackingRecord, ToolError> {
        validate_tracking_number(tracking_number)?;
        self.records.get(tracking_number).cloned().ok_or_else(|| ToolError::NotFound {
            resource: "tracking record".to_string(),
            identifier: tracking_number.to_string(),
        })
    }
}

fn validate_tracking_number(tracking_number: &str) -> Result<(), ToolError> {
    let well_formed = tracking_number.len() == 9
        && tracking_number.chars().all(|character| character.is_ascii_digit());
    if !well_formed {
        return Err(ToolError::invalid_argument(
            "tracking_number",
            "must be a 9 digit number",
        ));
    }
    Ok(())
}

#[derive(Deserialize)]
struct TrackShipmentArgs {
    tracking_number: String,
}

#[async_trait]
impl Tool for TrackShipmentTool {
    fn name(&self) -> &'static str {
        "track_shipment"
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: TrackShipmentArgs = serde_json::from_value(args)
            .map_err(|error| ToolError::invalid_argument("args", error.to_string()))?;
        let record = self.lookup(&args.tracking_number)?;
        Ok(json!({"tracking_number": args.tracking_number, "tracking": record}))
    }
}

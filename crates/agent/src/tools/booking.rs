use async_trait::async_trait;
use glidedesk_core::ToolError;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::Tool;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceLevel {
    Economy,
    Express,
}

impl ServiceLevel {
    fn parse(value: &str) -> Result<Self, ToolError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ECONOMY" => Ok(Self::Economy),
            "EXPRESS" => Ok(Self::Express),
            other => Err(ToolError::invalid_argument(
                "service_level",
                format!("`{other}` is not a valid service level (expected ECONOMY or EXPRESS)"),
            )),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct BookingDetails {
    pub collection_address: String,
    pub delivery_address: String,
    pub package_description: String,
    pub package_weight: f64,
    pub service_level: String,
    pub contact_email_address: String,
}

/// Creates a new shipment booking.
///
/// NOT idempotent: every successful call mints a fresh booking id, so
/// repeated calls create duplicate bookings. Callers are expected to confirm
/// with the user before invoking.
pub struct CreateBookingTool {
    max_weight_kg: f64,
}

impl CreateBookingTool {
    pub fn new(max_weight_kg: f64) -> Self {
        Self { max_weight_kg }
    }

    pub fn create(&self, details: &BookingDetails) -> Result<String, ToolError> {
        self.validate(details)?;

        let booking_id = generate_booking_id();
        info!(
            event_name = "tool.booking.created",
            booking_id = %booking_id,
            service_level = %details.service_level.to_ascii_uppercase(),
            package_weight = details.package_weight,
            "booking created"
        );
        Ok(booking_id)
    }

    fn validate(&self, details: &BookingDetails) -> Result<(), ToolError> {
        require_non_empty("collection_address", &details.collection_address)?;
        require_non_empty("delivery_address", &details.delivery_address)?;
        require_non_empty("package_description", &details.package_description)?;

        if !(details.package_weight > 0.0) {
            return Err(ToolError::invalid_argument(
                "package_weight",
                "package weight must be greater than zero",
            ));
        }
        if details.package_weight > self.max_weight_kg {
            return Err(ToolError::invalid_argument(
                "package_weight",
                format!("package weight cannot be greater than {} kg", self.max_weight_kg),
            ));
        }

        ServiceLevel::parse(&details.service_level)?;
        validate_email(&details.contact_email_address)?;

        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::invalid_argument(field, "must be non-empty"));
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), ToolError> {
    let trimmed = value.trim();
    let valid = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(ToolError::invalid_argument(
            "contact_email_address",
            "must be a valid email address",
        ));
    }
    Ok(())
}

fn generate_booking_id() -> String {
    let last_two_digits = rand::thread_rng().gen_range(0..100);
    format!("101{last_two_digits:02}")
}

#[async_trait]
impl Tool for CreateBookingTool {
    fn name(&self) -> &'static str {
        "create_booking"
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let details: BookingDetails = serde_json::from_value(args)
            .map_err(|error| ToolError::invalid_argument("args", error.to_string()))?;
        let booking_id = self.create(&details)?;
        Ok(json!({"booking_id": booking_id}))
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of support capabilities a request can be routed to.
///
/// Ordering of `ALL` matches classification priority and is part of the
/// routing contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityName {
    Faq,
    Booking,
    Tracking,
    Onboarding,
    IdValidation,
}

impl CapabilityName {
    pub const ALL: [CapabilityName; 5] =
        [Self::Faq, Self::Booking, Self::Tracking, Self::Onboarding, Self::IdValidation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faq => "faq",
            Self::Booking => "booking",
            Self::Tracking => "tracking",
            Self::Onboarding => "onboarding",
            Self::IdValidation => "id_validation",
        }
    }

    /// Wire-facing agent name carried in `AgentResponse.agent`.
    pub fn agent_label(&self) -> &'static str {
        match self {
            Self::Faq => "FAQAgent",
            Self::Booking => "BookingAgent",
            Self::Tracking => "TrackingAgent",
            Self::Onboarding => "OnboardingAgent",
            Self::IdValidation => "IDValidationAgent",
        }
    }
}

impl std::fmt::Display for CapabilityName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown capability `{0}` (expected faq|booking|tracking|onboarding|id_validation)")]
pub struct UnknownCapability(pub String);

impl std::str::FromStr for CapabilityName {
    type Err = UnknownCapability;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "faq" => Ok(Self::Faq),
            "booking" => Ok(Self::Booking),
            "tracking" => Ok(Self::Tracking),
            "onboarding" => Ok(Self::Onboarding),
            "id_validation" => Ok(Self::IdValidation),
            other => Err(UnknownCapability(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CapabilityName;

    #[test]
    fn round_trips_through_str() {
        for capability in CapabilityName::ALL {
            let parsed: CapabilityName = capability.as_str().parse().expect("known name");
            assert_eq!(parsed, capability);
        }
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("billing".parse::<CapabilityName>().is_err());
        assert!("".parse::<CapabilityName>().is_err());
    }

    #[test]
    fn agent_labels_match_wire_contract() {
        assert_eq!(CapabilityName::Booking.agent_label(), "BookingAgent");
        assert_eq!(CapabilityName::IdValidation.agent_label(), "IDValidationAgent");
    }
}

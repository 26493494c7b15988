use glidedesk_core::{CapabilityName, SupportRequest};

/// One ordered substring rule. The first rule whose keyword appears in the
/// lower-cased utterance wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassificationRule {
    pub keywords: &'static [&'static str],
    pub target: CapabilityName,
}

/// Total, deterministic intent classifier.
///
/// Rule order is part of the contract: booking tokens are tested before
/// tracking, tracking before onboarding, onboarding before identity-document
/// tokens, and anything unmatched falls through to the default capability.
#[derive(Clone, Debug)]
pub struct IntentClassifier {
    rules: Vec<ClassificationRule>,
    default: CapabilityName,
}

const DEFAULT_RULES: &[ClassificationRule] = &[
    ClassificationRule { keywords: &["book"], target: CapabilityName::Booking },
    ClassificationRule { keywords: &["track"], target: CapabilityName::Tracking },
    ClassificationRule { keywords: &["onboard", "register"], target: CapabilityName::Onboarding },
    ClassificationRule {
        keywords: &["id", "identity", "upload"],
        target: CapabilityName::IdValidation,
    },
];

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::with_default(CapabilityName::Faq)
    }
}

impl IntentClassifier {
    pub fn with_default(default: CapabilityName) -> Self {
        Self { rules: DEFAULT_RULES.to_vec(), default }
    }

    pub fn with_rules(rules: Vec<ClassificationRule>, default: CapabilityName) -> Self {
        Self { rules, default }
    }

    /// Maps a request to exactly one capability. Never fails.
    ///
    /// An explicit intent naming a known capability overrides inference;
    /// an unknown intent string falls through to keyword matching.
    pub fn classify(&self, request: &SupportRequest) -> CapabilityName {
        if let Some(intent) = request.intent.as_deref() {
            if let Ok(capability) = intent.parse::<CapabilityName>() {
                return capability;
            }
        }

        let utterance = request.text.as_deref().unwrap_or("").to_ascii_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|keyword| utterance.contains(keyword)))
            .map(|rule| rule.target)
            .unwrap_or(self.default)
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One inbound support request. Created per call, never persisted.
///
/// Invariants checked by [`SupportRequest::validate`]: `user_id` is
/// non-empty and at least one of `text`, `intent`, or `attachment_ref`
/// is present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRequest {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_ref: Option<String>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("user_id must be present and non-empty")]
    MissingUserId,
    #[error("request must carry at least one of text, intent, or attachment_ref")]
    EmptyPayload,
}

impl SupportRequest {
    pub fn with_text(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), text: Some(text.into()), intent: None, attachment_ref: None }
    }

    pub fn with_intent(user_id: impl Into<String>, intent: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), text: None, intent: Some(intent.into()), attachment_ref: None }
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.user_id.trim().is_empty() {
            return Err(RequestError::MissingUserId);
        }

        let has_payload = self.text.as_deref().is_some_and(|value| !value.trim().is_empty())
            || self.intent.as_deref().is_some_and(|value| !value.trim().is_empty())
            || self.attachment_ref.as_deref().is_some_and(|value| !value.trim().is_empty());
        if !has_payload {
            return Err(RequestError::EmptyPayload);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestError, SupportRequest};

    #[test]
    fn accepts_text_only_request() {
        let request = SupportRequest::with_text("u1", "track my package");
        assert_eq!(request.validate(), Ok(()));
    }

    #[test]
    fn accepts_attachment_only_request() {
        let request = SupportRequest {
            user_id: "u1".to_string(),
            text: None,
            intent: None,
            attachment_ref: Some("mem://uploads/file123".to_string()),
        };
        assert_eq!(request.validate(), Ok(()));
    }

    #[test]
    fn rejects_blank_user_id() {
        let request = SupportRequest::with_text("  ", "hello");
        assert_eq!(request.validate(), Err(RequestError::MissingUserId));
    }

    #[test]
    fn rejects_request_without_payload() {
        let request = SupportRequest {
            user_id: "u1".to_string(),
            text: Some("   ".to_string()),
            intent: None,
            attachment_ref: None,
        };
        assert_eq!(request.validate(), Err(RequestError::EmptyPayload));
    }

    #[test]
    fn deserializes_minimal_wire_shape() {
        let request: SupportRequest =
            serde_json::from_str(r#"{"user_id":"u1","text":"hi"}"#).expect("valid json");
        assert_eq!(request.user_id, "u1");
        assert_eq!(request.intent, None);
        assert_eq!(request.attachment_ref, None);
    }
}

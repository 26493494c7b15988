use serde_json::{json, Value};
use thiserror::Error;

/// Failure taxonomy for the tool-invocation boundary.
///
/// Only `UpstreamUnavailable` is retryable; everything else is a content or
/// caller problem that a retry cannot fix.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("invalid argument `{field}`: {message}")]
    InvalidArgument { field: String, message: String },
    #[error("upstream `{service}` unavailable: {message}")]
    UpstreamUnavailable { service: String, message: String },
    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String, raw_output: Option<String> },
    #[error("no {resource} found for `{identifier}`")]
    NotFound { resource: String, identifier: String },
}

impl ToolError {
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument { field: field.into(), message: message.into() }
    }

    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable { service: service.into(), message: message.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::ExtractionFailed { .. } => "extraction_failed",
            Self::NotFound { .. } => "not_found",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. })
    }

    /// Observability payload carried in response `data` and error envelopes.
    pub fn as_wire_value(&self) -> Value {
        let mut wire = json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::ExtractionFailed { raw_output: Some(raw_output), .. } = self {
            wire["raw_output"] = Value::String(raw_output.clone());
        }
        wire
    }
}

/// Transport-facing error shape with a user-safe message and a correlation
/// id for log joins.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ToolError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            Self::InvalidArgument { .. } | Self::NotFound { .. } | Self::ExtractionFailed { .. } => {
                InterfaceError::BadRequest { message: self.to_string(), correlation_id }
            }
            Self::UpstreamUnavailable { .. } => {
                InterfaceError::ServiceUnavailable { message: self.to_string(), correlation_id }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InterfaceError, ToolError};

    #[test]
    fn only_upstream_failures_are_retryable() {
        assert!(ToolError::upstream("ocr", "connection refused").is_retryable());
        assert!(!ToolError::invalid_argument("tracking_number", "not 9 digits").is_retryable());
        assert!(!ToolError::ExtractionFailed {
            message: "no text found".to_string(),
            raw_output: None,
        }
        .is_retryable());
    }

    #[test]
    fn wire_value_carries_raw_output_for_extraction_failures() {
        let error = ToolError::ExtractionFailed {
            message: "no PAN fields recognized".to_string(),
            raw_output: Some("garbled".to_string()),
        };
        let wire = error.as_wire_value();
        assert_eq!(wire["kind"], "extraction_failed");
        assert_eq!(wire["raw_output"], "garbled");

        let not_found = ToolError::NotFound {
            resource: "tracking record".to_string(),
            identifier: "000000000".to_string(),
        };
        assert!(not_found.as_wire_value().get("raw_output").is_none());
    }

    #[test]
    fn upstream_maps_to_service_unavailable_interface_error() {
        let interface = ToolError::upstream("ocr", "timeout").into_interface("req-7");
        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(interface.correlation_id(), "req-7");
        assert_eq!(
            interface.user_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
    }
}

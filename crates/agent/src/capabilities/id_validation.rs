use std::sync::Arc;

use async_trait::async_trait;
use glidedesk_core::{AgentResponse, CapabilityName, NextAction, SupportRequest, ToolError};
use serde_json::Map;
use tracing::warn;

use super::{error_data, CapabilityAgent};
use crate::storage::BlobStore;
use crate::tools::ocr::OcrEngine;
use crate::tools::pan::{extract_pan_details, PanDetails};

/// Two-step identity validation. State lives entirely in whether the call
/// carries an attachment: without one the agent asks for an upload, with one
/// it runs blob fetch → OCR → PAN scrape and asks for confirmation.
pub struct IdValidationAgent {
    blobs: Arc<dyn BlobStore>,
    ocr: Arc<dyn OcrEngine>,
}

impl IdValidationAgent {
    pub fn new(blobs: Arc<dyn BlobStore>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self { blobs, ocr }
    }

    async fn extract(&self, attachment_ref: &str) -> Result<PanDetails, ToolError> {
        let image = self.blobs.get(attachment_ref).await?;
        let text = self.ocr.detect_text(&image).await?;
        if text.trim().is_empty() {
            return Err(ToolError::ExtractionFailed {
                message: "no text found in image".to_string(),
                raw_output: None,
            });
        }

        let details = extract_pan_details(&text);
        if details.is_empty() {
            return Err(ToolError::ExtractionFailed {
                message: "no PAN card fields recognized".to_string(),
                raw_output: Some(text),
            });
        }
        Ok(details)
    }
}

#[async_trait]
impl CapabilityAgent for IdValidationAgent {
    fn name(&self) -> CapabilityName {
        CapabilityName::IdValidation
    }

    async fn handle(&self, request: &SupportRequest) -> AgentResponse {
        let agent_label = self.name().agent_label();

        let Some(attachment_ref) = request.attachment_ref.as_deref() else {
            return AgentResponse::text_only(agent_label, "Please upload your ID card image.")
                .with_next_action(NextAction::AwaitFileUpload);
        };

        match self.extract(attachment_ref).await {
            Ok(details) => {
                let name = details.name.as_deref().unwrap_or("unknown");
                let pan_number = details.pan_number.as_deref().unwrap_or("unknown");
                let text =
                    format!("ID Extracted: Name: {name}, ID#: {pan_number}. Is this correct?");

                let mut data = Map::new();
                data.insert("attachment_ref".to_string(), attachment_ref.into());
                data.insert(
                    "extracted_pan".to_string(),
                    serde_json::to_value(&details).unwrap_or_default(),
                );

                AgentResponse::text_only(agent_label, text)
                    .with_data(data)
                    .with_next_action(NextAction::AwaitConfirmation)
            }
            Err(error) => {
                warn!(
                    event_name = "capability.id_validation.extract_failed",
                    user_id = %request.user_id,
                    attachment_ref = %attachment_ref,
                    error = %error,
                    "identity document extraction failed"
                );
                AgentResponse::text_only(
                    agent_label,
                    "We could not read the uploaded document. \
                     Please upload a clearer image of your ID card.",
                )
                .with_data(error_data(&error))
                .with_next_action(NextAction::AwaitFileUpload)
            }
        }
    }
}

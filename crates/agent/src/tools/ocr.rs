use std::sync::Arc;

use async_trait::async_trait;
use glidedesk_core::ToolError;
use serde::Deserialize;
use serde_json::{json, Value};

use super::Tool;
use crate::storage::BlobStore;

/// Seam for the document-text-detection collaborator.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn detect_text(&self, image: &[u8]) -> Result<String, ToolError>;
}

/// Deterministic engine used when no OCR service is configured: any
/// non-empty image resolves to a canned PAN-card text block. Mirrors the
/// demo behavior of the original deployment.
#[derive(Default)]
pub struct FixtureOcrEngine;

pub const FIXTURE_CARD_TEXT: &str = "INCOME TAX DEPARTMENT\n\
GOVT. OF INDIA\n\
RAVI KUMAR\n\
SURESH KUMAR\n\
12/05/1985\n\
Permanent Account Number\n\
ABCDE1234F\n\
MALE\n";

#[async_trait]
impl OcrEngine for FixtureOcrEngine {
    async fn detect_text(&self, image: &[u8]) -> Result<String, ToolError> {
        if image.is_empty() {
            return Err(ToolError::invalid_argument("image", "no image bytes provided"));
        }
        Ok(FIXTURE_CARD_TEXT.to_string())
    }
}

/// Resolves an attachment through the blob store and runs text detection.
/// Idempotent: the same attachment always yields the same text.
pub struct ExtractTextTool {
    blobs: Arc<dyn BlobStore>,
    engine: Arc<dyn OcrEngine>,
}

impl ExtractTextTool {
    pub fn new(blobs: Arc<dyn BlobStore>, engine: Arc<dyn OcrEngine>) -> Self {
        Self { blobs, engine }
    }

    pub async fn extract(&self, attachment_ref: &str) -> Result<String, ToolError> {
        let image = self.blobs.get(attachment_ref).await?;
        let text = self.engine.detect_text(&image).await?;
        if text.trim().is_empty() {
            return Err(ToolError::ExtractionFailed {
                message: "no text found in image".to_string(),
                raw_output: None,
            });
        }
        Ok(text)
    }
}

#[derive(Deserialize)]
struct ExtractTextArgs {
    attachment_ref: String,
}

#[async_trait]
impl Tool for ExtractTextTool {
    fn name(&self) -> &'static str {
        "extract_text"
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: ExtractTextArgs = serde_json::from_value(args)
            .map_err(|error| ToolError::invalid_argument("args", error.to_string()))?;
        let full_text = self.extract(&args.attachment_ref).await?;
        Ok(json!({"attachment_ref": args.attachment_ref, "full_text": full_text}))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::{ExtractTextTool, FixtureOcrEngine, OcrEngine};
    use crate::storage::{BlobStore, InMemoryBlobStore};
    use crate::tools::Tool;

    #[tokio::test]
    async fn fixture_engine_rejects_empty_images() {
        let engine = FixtureOcrEngine;
        let error = engine.detect_text(&[]).await.err().expect("error");
        assert_eq!(error.kind(), "invalid_argument");
    }

    #[tokio::test]
    async fn extracts_text_from_stored_attachment() {
        let blobs = Arc::new(InMemoryBlobStore::new("bucket", "image_temp"));
        let uri = blobs.put(vec![0xFF, 0xD8], Some("id.jpg")).await.expect("stored");

        let tool = ExtractTextTool::new(blobs, Arc::new(FixtureOcrEngine));
        let result = tool.invoke(json!({"attachment_ref": uri})).await.expect("success");
        let full_text = result["full_text"].as_str().expect("text");
        assert!(full_text.contains("ABCDE1234F"));
    }

    #[tokio::test]
    async fn missing_attachment_is_not_found() {
        let blobs = Arc::new(InMemoryBlobStore::new("bucket", "image_temp"));
        let tool = ExtractTextTool::new(blobs, Arc::new(FixtureOcrEngine));

        let error = tool.extract("mem://bucket/image_temp/missing").await.err().expect("error");
        assert_eq!(error.kind(), "not_found");
    }
}

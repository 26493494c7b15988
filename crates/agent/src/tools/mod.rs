pub mod booking;
pub mod ocr;
pub mod pan;
pub mod retrieval;
pub mod tracking;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use glidedesk_core::ToolError;
use serde_json::{json, Map, Value};

pub use booking::CreateBookingTool;
pub use ocr::{ExtractTextTool, FixtureOcrEngine, OcrEngine};
pub use pan::{extract_pan_details, PanDetails, PanParseTool};
pub use retrieval::{DocumentIndex, DocumentSnippet, RagQueryTool};
pub use tracking::{TrackShipmentTool, TrackingRecord};

/// One callback tool. Tools validate their own arguments and fail with a
/// typed [`ToolError`] instead of an ad hoc payload.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    async fn invoke(&self, args: Value) -> Result<Value, ToolError>;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Last-write-wins by tool name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names = self.tools.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Looks up and invokes a tool by name. An unknown name is an
    /// `invalid_argument` error, never a panic.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let Some(tool) = self.get(name) else {
            return Err(ToolError::invalid_argument(
                "tool",
                format!("tool `{name}` is not implemented"),
            ));
        };
        tool.invoke(args).await
    }
}

/// Wire envelope for a successful tool result: `{"status": "success", ...}`.
pub fn success_envelope(fields: Value) -> Value {
    let mut envelope = Map::new();
    envelope.insert("status".to_string(), json!("success"));
    match fields {
        Value::Object(map) => {
            for (key, value) in map {
                envelope.insert(key, value);
            }
        }
        Value::Null => {}
        other => {
            envelope.insert("result".to_string(), other);
        }
    }
    Value::Object(envelope)
}

/// Wire envelope for a failed tool result: `{"status": "error", "error": ...}`.
pub fn error_envelope(error: &ToolError) -> Value {
    json!({"status": "error", "error": error.as_wire_value()})
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glidedesk_core::ToolError;
    use serde_json::{json, Value};

    use super::{error_envelope, success_envelope, Tool, ToolRegistry};

    struct EchoTool;

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
            Ok(json!({"echoed": args}))
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_a_structured_error() {
        let registry = ToolRegistry::default();
        let error = registry.invoke("missing", json!({})).await.err().expect("error");
        assert_eq!(error.kind(), "invalid_argument");
        assert!(error.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn registered_tool_is_invocable_by_name() {
        let mut registry = ToolRegistry::default();
        registry.register(Arc::new(EchoTool));

        let result = registry.invoke("echo", json!({"k": 1})).await.expect("success");
        assert_eq!(result["echoed"]["k"], 1);
        assert_eq!(registry.names(), vec!["echo".to_string()]);
    }

    #[test]
    fn envelopes_use_the_uniform_status_shape() {
        let success = success_envelope(json!({"booking_id": "10155"}));
        assert_eq!(success["status"], "success");
        assert_eq!(success["booking_id"], "10155");

        let error = error_envelope(&ToolError::invalid_argument("text", "too short"));
        assert_eq!(error["status"], "error");
        assert_eq!(error["error"]["kind"], "invalid_argument");
    }
}

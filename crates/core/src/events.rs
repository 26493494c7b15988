use serde::{Deserialize, Serialize};

use crate::domain::response::AgentResponse;

/// One event in a streamed reply. Streams are ordered and end with exactly
/// one terminal event (`stream_end` or `error`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    Thought(String),
    AgentMessageChunk(String),
    AgentResponse(AgentResponse),
    Error { message: String },
    StreamEnd { message: String },
}

impl StreamEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Thought(_) => "thought",
            Self::AgentMessageChunk(_) => "agent_message_chunk",
            Self::AgentResponse(_) => "agent_response",
            Self::Error { .. } => "error",
            Self::StreamEnd { .. } => "stream_end",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::StreamEnd { .. })
    }
}

/// Ordered event sink for streamed dispatch.
///
/// Contract: the producer emits at most one terminal event; implementations
/// must drop anything emitted after it. `emit` never fails — a sink whose
/// consumer is gone swallows events instead of propagating errors into the
/// dispatch path.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: StreamEvent);
}

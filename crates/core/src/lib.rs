pub mod config;
pub mod domain;
pub mod errors;
pub mod events;

pub use domain::capability::CapabilityName;
pub use domain::request::{RequestError, SupportRequest};
pub use domain::response::{AgentResponse, NextAction};
pub use errors::{InterfaceError, ToolError};
pub use events::{EventSink, StreamEvent};

pub mod chat;
pub mod config;
pub mod doctor;

use serde::Serialize;

/// Output of one CLI command: a machine-readable line plus the process
/// exit code.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<'a> {
    command: &'a str,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<&'a str>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            output: serialize_outcome(CommandOutcome {
                command,
                status: "ok",
                error_class: None,
                message: message.into(),
            }),
        }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self {
            exit_code,
            output: serialize_outcome(CommandOutcome {
                command,
                status: "error",
                error_class: Some(error_class),
                message: message.into(),
            }),
        }
    }
}

fn serialize_outcome(outcome: CommandOutcome<'_>) -> String {
    serde_json::to_string(&outcome)
        .unwrap_or_else(|_| r#"{"command":"unknown","status":"error","message":"serialization failed"}"#.to_string())
}

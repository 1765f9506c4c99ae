pub mod config;
pub mod dashboard;
pub mod invoice;
pub mod quotations;

use serde::Serialize;
use serde_json::Value;

use dealdesk_core::source::SourceError;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::with_data(command, message, None)
    }

    pub fn with_data(command: &str, message: impl Into<String>, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Maps transport failures onto stable error classes so scripts can
/// branch on them without parsing messages.
pub(crate) fn source_failure(command: &str, error: &SourceError) -> CommandResult {
    let error_class = match error {
        SourceError::Status { status: 404 } => "not_found",
        SourceError::Status { status: 409 } => "stage_conflict",
        SourceError::Status { .. } => "backend_status",
        SourceError::Timeout => "timeout",
        SourceError::Network(_) => "network",
        SourceError::Decode(_) => "contract",
    };
    CommandResult::failure(command, error_class, error.to_string(), 1)
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

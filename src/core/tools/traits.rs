use crate::core::session::InvocationContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// Tagged result shared by the weather tool and the tool guardrail.
///
/// Serializes to `{"status": "success", "report": ...}` or
/// `{"status": "error", "error_message": ...}`. A guardrail block uses the
/// `Error` variant, so the model cannot tell policy from a real failure
/// except by the message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusResult {
    Success { report: String },
    Error { error_message: String },
}

impl StatusResult {
    pub fn success(report: impl Into<String>) -> Self {
        Self::Success {
            report: report.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error_message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Success { report } => serde_json::json!({
                "status": "success",
                "report": report,
            }),
            Self::Error { error_message } => serde_json::json!({
                "status": "error",
                "error_message": error_message,
            }),
        }
    }
}

/// Description of a tool for the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A capability the model can call by name.
pub trait Tool: Send + Sync {
    /// Tool name (used in LLM function calling)
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// JSON schema for parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the model-supplied arguments.
    ///
    /// The returned value is handed to the model verbatim. Expected failures
    /// (bad arguments, upstream errors) belong in the value, not in `Err`.
    fn execute<'a>(
        &'a self,
        args: Value,
        ctx: &'a InvocationContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send + 'a>>;

    /// Get the full spec for LLM registration
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_result_error_shape() {
        let value = StatusResult::error("boom").to_value();
        assert_eq!(value, json!({"status": "error", "error_message": "boom"}));
    }

    #[test]
    fn status_result_serde_matches_to_value() {
        let success = StatusResult::success("sunny");
        assert_eq!(serde_json::to_value(&success).unwrap(), success.to_value());

        let error = StatusResult::error("nope");
        assert_eq!(serde_json::to_value(&error).unwrap(), error.to_value());
    }

    #[test]
    fn status_result_parses_tagged_json() {
        let parsed: StatusResult =
            serde_json::from_value(json!({"status": "success", "report": "ok"})).unwrap();
        assert!(parsed.is_success());
    }
}

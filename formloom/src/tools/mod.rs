//! Tools the planner can call: the [`Tool`] trait for plain tools, the shared
//! [`ToolError`] taxonomy, the [`ToolRegistry`] of everything registered, and the
//! universal [`FormResetTool`].

mod available;
mod form_reset;
mod registry;

pub use available::AvailableTool;
pub use form_reset::{FormResetTool, FORM_RESET_TOOL_NAME};
pub use registry::ToolRegistry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::form::{FormToolState, ValidationError};
use crate::outcome::ToolOutcome;

/// Tool description handed to the planner: name, description and JSON Schema input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Failure of one tool call. Every variant is recoverable: the tool node records it as
/// the step's observation and as the turn's `error`.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Merged form data violates a field or cross-field rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Operation not allowed in the form tool's current state.
    #[error("{tool} cannot {operation} while {state}")]
    InvalidState {
        tool: String,
        operation: &'static str,
        state: FormToolState,
    },

    /// Input could not be understood by a plain tool.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The action executor failed; the text describes why.
    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    /// Short kind label used in observations, e.g. `ValidationError`.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Validation(_) => "ValidationError",
            ToolError::InvalidState { .. } => "InvalidStateError",
            ToolError::InvalidInput(_) => "InvalidInputError",
            ToolError::Execution(_) => "ToolExecutionError",
        }
    }

    /// `"<Kind>: <message>"`, the text recorded as the failed step's observation.
    pub fn observation(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

/// Observer message used when a tool has no better description of what it is doing.
pub fn default_start_message(name: &str, input: &Value) -> String {
    format!("{}: {}", name, input)
}

/// A plain (non-form) tool: one call, one outcome.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn spec(&self) -> ToolSpec;

    async fn call(&self, args: Value) -> Result<ToolOutcome, ToolError>;

    /// Human-readable description of the call about to happen, for observers.
    fn start_message(&self, input: &Value) -> String {
        default_start_message(self.name(), input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_prefixes_kind() {
        let err = ToolError::Execution("mail server refused".into());
        assert_eq!(err.observation(), "ToolExecutionError: mail server refused");
        let err = ToolError::from(ValidationError::Form("bad".into()));
        assert_eq!(err.observation(), "ValidationError: bad");
        let err = ToolError::InvalidState {
            tool: "SendEmailStart".into(),
            operation: "finalize",
            state: FormToolState::Inactive,
        };
        assert_eq!(
            err.to_string(),
            "SendEmailStart cannot finalize while INACTIVE"
        );
    }
}

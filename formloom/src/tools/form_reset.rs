//! FormReset: lets the planner abandon the active form.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolError, ToolSpec};
use crate::outcome::ToolOutcome;

/// Advertised name of the reset tool.
pub const FORM_RESET_TOOL_NAME: &str = "FormReset";

const DESCRIPTION: &str = "Call this tool when the user doesn't want to complete the form anymore. DON'T call it when they want to change some data.";

/// Clears the active form tool. Offered only while a form is active.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormResetTool;

#[async_trait]
impl Tool for FormResetTool {
    fn name(&self) -> &str {
        FORM_RESET_TOOL_NAME
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: FORM_RESET_TOOL_NAME.to_string(),
            description: Some(DESCRIPTION.to_string()),
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    async fn call(&self, _args: Value) -> Result<ToolOutcome, ToolError> {
        Ok(
            ToolOutcome::new("Form reset. Form cleared. Ask the user what they want to do next.")
                .with_active_form_tool(None),
        )
    }

    fn start_message(&self, _input: &Value) -> String {
        "Resetting the active form".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reset_clears_active_form() {
        let out = FormResetTool.call(json!({})).await.unwrap();
        assert!(out.output.starts_with("Form reset."));
        assert!(matches!(out.state_update.active_form_tool, Some(None)));
        assert!(!out.return_direct);
    }
}

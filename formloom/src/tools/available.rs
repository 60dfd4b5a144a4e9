//! One entry of the tool list the planner sees: a plain tool or a form tool.

use std::sync::Arc;

use serde_json::Value;

use super::{Tool, ToolSpec};
use crate::form::FormTool;

/// A tool the planner may call. Form tools are carried by value because their
/// advertised identity depends on their state.
#[derive(Clone)]
pub enum AvailableTool {
    Base(Arc<dyn Tool>),
    Form(FormTool),
}

impl AvailableTool {
    pub fn name(&self) -> String {
        match self {
            AvailableTool::Base(tool) => tool.name().to_string(),
            AvailableTool::Form(tool) => tool.name(),
        }
    }

    pub fn spec(&self) -> ToolSpec {
        match self {
            AvailableTool::Base(tool) => tool.spec(),
            AvailableTool::Form(tool) => tool.spec(),
        }
    }

    pub fn is_form(&self) -> bool {
        matches!(self, AvailableTool::Form(_))
    }

    pub fn as_form(&self) -> Option<&FormTool> {
        match self {
            AvailableTool::Form(tool) => Some(tool),
            AvailableTool::Base(_) => None,
        }
    }

    pub fn start_message(&self, input: &Value) -> String {
        match self {
            AvailableTool::Base(tool) => tool.start_message(input),
            AvailableTool::Form(tool) => tool.tool_start_message(input),
        }
    }
}

impl std::fmt::Debug for AvailableTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvailableTool::Base(tool) => f.debug_tuple("Base").field(&tool.name()).finish(),
            AvailableTool::Form(tool) => f.debug_tuple("Form").field(tool).finish(),
        }
    }
}

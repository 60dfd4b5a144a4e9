//! Tool observer: callbacks around every tool call, for UIs and audit logs.
//!
//! Observers only watch. The tool node catches panics raised by an observer and logs
//! them; a misbehaving observer never changes the turn's outcome.

use tracing::{info, warn};

use crate::tools::ToolError;

pub trait ToolObserver: Send + Sync {
    /// Called before the tool runs with its human-readable start message.
    fn on_tool_start(&self, tool: &str, message: &str);

    /// Called after the tool succeeded with its output text.
    fn on_tool_end(&self, tool: &str, output: &str);

    fn on_tool_error(&self, tool: &str, error: &ToolError) {
        let _ = (tool, error);
    }
}

/// Observer that writes each event to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingToolObserver;

impl ToolObserver for LoggingToolObserver {
    fn on_tool_start(&self, tool: &str, message: &str) {
        info!(tool, message, "tool start");
    }

    fn on_tool_end(&self, tool: &str, output: &str) {
        info!(tool, output, "tool end");
    }

    fn on_tool_error(&self, tool: &str, error: &ToolError) {
        warn!(tool, error = %error, "tool error");
    }
}

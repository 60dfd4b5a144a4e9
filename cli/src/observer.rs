//! Prints tool activity to stderr so stdout only carries replies.

use formloom::{ToolError, ToolObserver};

#[derive(Clone, Copy, Debug, Default)]
pub struct PrintingObserver;

impl ToolObserver for PrintingObserver {
    fn on_tool_start(&self, tool: &str, message: &str) {
        eprintln!("[{}] {}", tool, message);
    }

    fn on_tool_end(&self, tool: &str, output: &str) {
        eprintln!("[{}] done: {}", tool, output);
    }

    fn on_tool_error(&self, tool: &str, error: &ToolError) {
        eprintln!("[{}] failed: {}", tool, error);
    }
}

//! Chat history entries.

use serde::{Deserialize, Serialize};

/// One message of the conversation as the planner sees it.
///
/// Serialized as `{"role": "user", "content": "..."}` so stored histories stay readable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum Message {
    System(String),
    User(String),
    Assistant(String),
    /// Assistant turn that called a tool; `id` pairs it with its [`Message::ToolResult`].
    #[serde(rename = "tool_call")]
    ToolCall {
        id: String,
        name: String,
        /// Arguments as JSON text.
        arguments: String,
    },
    /// What the tool call with the same `id` returned.
    #[serde(rename = "tool")]
    ToolResult { id: String, content: String },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(content.into())
    }

    pub fn tool_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self::ToolCall {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    pub fn tool_result(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            id: id.into(),
            content: content.into(),
        }
    }

    /// Text of the message; the JSON arguments for a tool call.
    pub fn content(&self) -> &str {
        match self {
            Message::System(c) | Message::User(c) | Message::Assistant(c) => c,
            Message::ToolCall { arguments, .. } => arguments,
            Message::ToolResult { content, .. } => content,
        }
    }

    /// Chat role the provider expects: `system`, `user`, `assistant` or `tool`.
    pub fn role(&self) -> &'static str {
        match self {
            Message::System(_) => "system",
            Message::User(_) => "user",
            Message::Assistant(_) | Message::ToolCall { .. } => "assistant",
            Message::ToolResult { .. } => "tool",
        }
    }
}

//! Planner capability: turn a [`PlannerRequest`] into a final answer or tool calls.
//!
//! [`MockLlm`] replays scripted responses for tests and demos; [`ChatOpenAI`] talks to an
//! OpenAI-compatible chat completions endpoint through `async-openai`.

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::ChatOpenAI;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prompts::PlannerRequest;

/// One function call returned by the planner; `arguments` is the raw JSON text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: Option<String>,
    pub name: String,
    pub arguments: String,
}

/// Token usage reported by the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Raw planner reply: assistant text and/or tool calls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<LlmUsage>,
}

impl LlmResponse {
    pub fn answer(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn tool_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            tool_calls: vec![ToolCall {
                id: None,
                name: name.into(),
                arguments: arguments.into(),
            }],
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LlmError {
    /// The reply could not be understood (no choices, neither text nor tool calls,
    /// malformed tool arguments). The agent retries with the error-correction prompt.
    #[error("planner output could not be parsed: {0}")]
    Parse(String),
    /// The provider could not be reached or refused the request. Ends the turn.
    #[error("planner request failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, request: &PlannerRequest) -> Result<LlmResponse, LlmError>;
}

//! Per-turn agent state: what the execution graph passes between the agent and tool nodes.
//!
//! One [`AgentState`] lives for one user turn. Only `chat_history` and
//! `active_form_tool` survive the turn (through the state store); everything else is
//! rebuilt from scratch when the next message arrives.
//!
//! **Interaction**: written by [`AgentNode`](crate::AgentNode) (`agent_outcome`,
//! `error`) and [`ToolNode`](crate::ToolNode) (`intermediate_steps`, `tool_outcome`,
//! `active_form_tool`, `tool_choice`); read by the filter and the prompt builder.

mod message;

pub use message::Message;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::form::FormTool;
use crate::outcome::ToolOutcome;

/// One tool call requested by the planner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Provider call id, when the planner returned one.
    #[serde(default)]
    pub id: Option<String>,
    pub tool: String,
    pub input: Value,
}

impl ToolInvocation {
    pub fn new(tool: impl Into<String>, input: Value) -> Self {
        Self {
            id: None,
            tool: tool.into(),
            input,
        }
    }
}

/// What the planner decided this step.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentOutcome {
    /// Final answer for the user.
    Finish(String),
    /// One or more tools to run, in order.
    Actions(Vec<ToolInvocation>),
}

/// A tool call and the observation it produced (output or error text).
#[derive(Clone, Debug, PartialEq)]
pub struct IntermediateStep {
    pub invocation: ToolInvocation,
    pub observation: String,
}

/// Graph state of one turn.
#[derive(Clone, Debug, Default)]
pub struct AgentState {
    /// The user's message for this turn.
    pub input: String,
    /// Prior exchanges, oldest first.
    pub chat_history: Vec<Message>,
    pub agent_outcome: Option<AgentOutcome>,
    /// Outcome of the last successful tool call.
    pub tool_outcome: Option<ToolOutcome>,
    /// Tool calls made so far this turn, oldest first.
    pub intermediate_steps: Vec<IntermediateStep>,
    /// Recoverable error the planner must react to on its next step.
    pub error: Option<String>,
    pub active_form_tool: Option<FormTool>,
    /// Tool name the planner is forced to call next.
    pub tool_choice: Option<String>,
}

impl AgentState {
    pub fn new(
        input: impl Into<String>,
        chat_history: Vec<Message>,
        active_form_tool: Option<FormTool>,
    ) -> Self {
        Self {
            input: input.into(),
            chat_history,
            active_form_tool,
            ..Self::default()
        }
    }

    /// Drops the oldest steps so at most `max` remain.
    pub fn truncate_steps(&mut self, max: usize) {
        let len = self.intermediate_steps.len();
        if len > max {
            self.intermediate_steps.drain(..len - max);
        }
    }

    /// The final answer, if the planner finished.
    pub fn finish_output(&self) -> Option<&str> {
        match &self.agent_outcome {
            Some(AgentOutcome::Finish(text)) => Some(text),
            _ => None,
        }
    }
}

//! Agent node: ask the planner what to do next.
//!
//! Reads the turn state, shows the planner the tools visible right now, and writes
//! either a final answer or the tool calls to run. Parse failures become
//! `AgentState::error` so the next visit uses the error-correction prompt; transport
//! failures end the turn.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::filter::select_tools;
use crate::graph::{Next, Node};
use crate::llm::{LlmClient, LlmError, LlmResponse};
use crate::prompts::PlannerPromptBuilder;
use crate::state::{AgentOutcome, AgentState, ToolInvocation};
use crate::tools::ToolRegistry;

pub const AGENT_NODE: &str = "agent";

/// Intermediate steps shown to the planner when not configured otherwise.
pub const DEFAULT_MAX_INTERMEDIATE_STEPS: usize = 5;

/// Parses the planner's raw argument text into JSON.
///
/// Blank text is an empty object. Some providers double-encode arguments as a JSON
/// string; that inner string is decoded as well. Anything else that is not valid JSON
/// is a parse error.
pub fn parse_tool_arguments(tool: &str, arguments: &str) -> Result<Value, LlmError> {
    if arguments.trim().is_empty() {
        return Ok(json!({}));
    }
    let invalid =
        |e: serde_json::Error| LlmError::Parse(format!("invalid arguments for {}: {}", tool, e));
    let raw: Value = serde_json::from_str(arguments).map_err(invalid)?;
    match raw.as_str() {
        Some(inner) if inner.trim().is_empty() => Ok(json!({})),
        Some(inner) => serde_json::from_str(inner).map_err(invalid),
        None => Ok(raw),
    }
}

/// Turns a planner reply into the step outcome: tool calls win over text.
pub fn interpret_response(response: LlmResponse) -> Result<AgentOutcome, LlmError> {
    if !response.tool_calls.is_empty() {
        let invocations = response
            .tool_calls
            .into_iter()
            .map(|call| {
                let input = parse_tool_arguments(&call.name, &call.arguments)?;
                Ok(ToolInvocation {
                    id: call.id,
                    tool: call.name,
                    input,
                })
            })
            .collect::<Result<Vec<_>, LlmError>>()?;
        return Ok(AgentOutcome::Actions(invocations));
    }
    if response.content.trim().is_empty() {
        return Err(LlmError::Parse(
            "planner returned neither an answer nor a tool call".into(),
        ));
    }
    Ok(AgentOutcome::Finish(response.content))
}

pub struct AgentNode {
    llm: Arc<dyn LlmClient>,
    registry: Arc<ToolRegistry>,
    prompts: PlannerPromptBuilder,
    max_intermediate_steps: usize,
}

impl AgentNode {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        registry: Arc<ToolRegistry>,
        prompts: PlannerPromptBuilder,
    ) -> Self {
        Self {
            llm,
            registry,
            prompts,
            max_intermediate_steps: DEFAULT_MAX_INTERMEDIATE_STEPS,
        }
    }

    pub fn with_max_intermediate_steps(mut self, max: usize) -> Self {
        self.max_intermediate_steps = max;
        self
    }
}

#[async_trait]
impl Node<AgentState> for AgentNode {
    fn id(&self) -> &str {
        AGENT_NODE
    }

    async fn run(&self, state: AgentState) -> Result<(AgentState, Next), AgentError> {
        let mut state = state;
        state.truncate_steps(self.max_intermediate_steps);
        let tools = select_tools(&self.registry, &state);
        let request = self.prompts.build(&state, &tools);
        debug!(
            kind = ?request.kind,
            tools = request.tools.len(),
            tool_choice = ?request.tool_choice,
            "planner request"
        );

        match self.llm.invoke(&request).await.and_then(interpret_response) {
            Ok(outcome) => {
                state.agent_outcome = Some(outcome);
                state.error = None;
                state.tool_choice = None;
                state.tool_outcome = None;
            }
            Err(LlmError::Parse(message)) => {
                warn!(error = %message, "planner output rejected, retrying");
                state.error = Some(LlmError::Parse(message).to_string());
                state.agent_outcome = None;
                state.tool_choice = None;
            }
            Err(LlmError::Transport(message)) => {
                return Err(AgentError::ExecutionFailed(message));
            }
        }
        Ok((state, Next::Continue))
    }
}

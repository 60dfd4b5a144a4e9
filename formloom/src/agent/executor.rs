//! Form agent: the two-node graph (`agent` ⇄ `tool`) wired on [`StateGraph`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::graph::{
    CompilationError, CompiledStateGraph, StateGraph, DEFAULT_RECURSION_LIMIT, END, START,
};
use crate::llm::LlmClient;
use crate::prompts::{FormAgentPrompts, PlannerPromptBuilder};
use crate::state::{AgentOutcome, AgentState};
use crate::tools::ToolRegistry;

use super::agent_node::{AgentNode, AGENT_NODE, DEFAULT_MAX_INTERMEDIATE_STEPS};
use super::observer::ToolObserver;
use super::tool_node::{ToolNode, TOOL_NODE};

/// Knobs of a [`FormAgent`]; `Default` matches [`AgentConfig`]'s defaults.
#[derive(Clone)]
pub struct FormAgentOptions {
    pub observer: Option<Arc<dyn ToolObserver>>,
    pub prompts: FormAgentPrompts,
    pub max_intermediate_steps: usize,
    pub recursion_limit: usize,
    /// Pins the persona's datetime; `None` uses the local clock.
    pub fixed_now: Option<NaiveDateTime>,
}

impl Default for FormAgentOptions {
    fn default() -> Self {
        Self {
            observer: None,
            prompts: FormAgentPrompts::default(),
            max_intermediate_steps: DEFAULT_MAX_INTERMEDIATE_STEPS,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            fixed_now: None,
        }
    }
}

impl FormAgentOptions {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            max_intermediate_steps: config.max_intermediate_steps,
            recursion_limit: config.recursion_limit,
            ..Self::default()
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ToolObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

fn route_after_agent(state: &AgentState) -> String {
    if state.error.is_some() {
        return AGENT_NODE.to_string();
    }
    match &state.agent_outcome {
        Some(AgentOutcome::Actions(_)) => TOOL_NODE.to_string(),
        _ => END.to_string(),
    }
}

fn route_after_tool(state: &AgentState) -> String {
    if state.error.is_some() {
        return AGENT_NODE.to_string();
    }
    match &state.tool_outcome {
        Some(outcome) if outcome.return_direct => END.to_string(),
        _ => AGENT_NODE.to_string(),
    }
}

fn path_map(targets: &[&str]) -> HashMap<String, String> {
    targets
        .iter()
        .map(|t| (t.to_string(), t.to_string()))
        .collect()
}

/// Runs one user turn: plan, call tools, repeat until an answer, a direct-return tool,
/// or the recursion limit.
#[derive(Clone)]
pub struct FormAgent {
    graph: CompiledStateGraph<AgentState>,
    registry: Arc<ToolRegistry>,
}

impl FormAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        registry: Arc<ToolRegistry>,
        options: FormAgentOptions,
    ) -> Result<Self, CompilationError> {
        let mut builder = PlannerPromptBuilder::new(options.prompts);
        if let Some(now) = options.fixed_now {
            builder = builder.with_fixed_now(now);
        }
        let agent = AgentNode::new(llm, registry.clone(), builder)
            .with_max_intermediate_steps(options.max_intermediate_steps);
        let mut tool = ToolNode::new(registry.clone());
        if let Some(observer) = options.observer {
            tool = tool.with_observer(observer);
        }

        let mut graph =
            StateGraph::<AgentState>::new().with_recursion_limit(options.recursion_limit);
        graph.add_node(AGENT_NODE, Arc::new(agent));
        graph.add_node(TOOL_NODE, Arc::new(tool));
        graph.add_edge(START, AGENT_NODE);
        graph.add_conditional_edges(
            AGENT_NODE,
            Arc::new(route_after_agent),
            Some(path_map(&[AGENT_NODE, TOOL_NODE, END])),
        );
        graph.add_conditional_edges(
            TOOL_NODE,
            Arc::new(route_after_tool),
            Some(path_map(&[AGENT_NODE, END])),
        );

        Ok(Self {
            graph: graph.compile()?,
            registry,
        })
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Runs the turn and returns the final state.
    pub async fn invoke(&self, state: AgentState) -> Result<AgentState, AgentError> {
        self.graph.invoke(state).await
    }
}

/// The turn's reply: the last tool's output when a tool ended the turn, else the
/// planner's final answer.
pub fn parse_output(state: &AgentState) -> Option<String> {
    if let Some(outcome) = &state.tool_outcome {
        return Some(outcome.output.clone());
    }
    state.finish_output().map(str::to_string)
}

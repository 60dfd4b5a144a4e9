//! Tool node: run the planner's tool calls in order and record what happened.
//!
//! Visible tools are re-resolved before every call because a call may activate or
//! clear a form. A failed call is recorded as its step's observation and its message
//! joins `AgentState::error`; the remaining calls of the batch still run.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::filter::select_tools;
use crate::graph::{Next, Node};
use crate::state::{AgentOutcome, AgentState, IntermediateStep, ToolInvocation};
use crate::tools::{default_start_message, AvailableTool, ToolError, ToolRegistry};

use super::observer::ToolObserver;

pub const TOOL_NODE: &str = "tool";

pub struct ToolNode {
    registry: Arc<ToolRegistry>,
    observer: Option<Arc<dyn ToolObserver>>,
}

fn guarded(hook: &str, f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        warn!(hook, "tool observer panicked");
    }
}

impl ToolNode {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ToolObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn notify_start(&self, tool: &AvailableTool, invocation: &ToolInvocation) {
        let Some(observer) = &self.observer else {
            return;
        };
        let message = catch_unwind(AssertUnwindSafe(|| tool.start_message(&invocation.input)))
            .unwrap_or_else(|_| default_start_message(&invocation.tool, &invocation.input));
        guarded("on_tool_start", || {
            observer.on_tool_start(&invocation.tool, &message)
        });
    }

    fn notify_end(&self, tool: &str, output: &str) {
        if let Some(observer) = &self.observer {
            guarded("on_tool_end", || observer.on_tool_end(tool, output));
        }
    }

    fn notify_error(&self, tool: &str, error: &ToolError) {
        if let Some(observer) = &self.observer {
            guarded("on_tool_error", || observer.on_tool_error(tool, error));
        }
    }

    /// Runs one invocation against the tools visible in `state`; returns the observation
    /// and, on failure, the error message for `AgentState::error`.
    async fn run_one(
        &self,
        state: &mut AgentState,
        invocation: &ToolInvocation,
    ) -> (String, Option<String>) {
        let visible = select_tools(&self.registry, state);
        let Some(tool) = visible.iter().find(|t| t.name() == invocation.tool).cloned() else {
            let names = visible
                .iter()
                .map(AvailableTool::name)
                .collect::<Vec<_>>()
                .join(", ");
            warn!(tool = %invocation.tool, "planner called an unknown tool");
            return (
                format!(
                    "{} is not a valid tool, try one of [{}].",
                    invocation.tool, names
                ),
                None,
            );
        };

        self.notify_start(&tool, invocation);
        let result = match tool {
            AvailableTool::Form(mut form) => form.invoke(&invocation.input).await,
            AvailableTool::Base(base) => base.call(invocation.input.clone()).await,
        };
        match result {
            Ok(mut outcome) => {
                self.notify_end(&invocation.tool, &outcome.output);
                let observation = outcome.output.clone();
                std::mem::take(&mut outcome.state_update).apply(state);
                state.tool_outcome = Some(outcome);
                debug!(tool = %invocation.tool, "tool succeeded");
                (observation, None)
            }
            Err(e) => {
                warn!(tool = %invocation.tool, error = %e, "tool failed");
                self.notify_error(&invocation.tool, &e);
                (e.observation(), Some(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl Node<AgentState> for ToolNode {
    fn id(&self) -> &str {
        TOOL_NODE
    }

    async fn run(&self, state: AgentState) -> Result<(AgentState, Next), AgentError> {
        let mut state = state;
        let invocations = match state.agent_outcome.take() {
            Some(AgentOutcome::Actions(invocations)) => invocations,
            other => {
                state.agent_outcome = other;
                return Ok((state, Next::Continue));
            }
        };

        let mut errors = Vec::new();
        for invocation in invocations {
            let (observation, error) = self.run_one(&mut state, &invocation).await;
            errors.extend(error);
            state.intermediate_steps.push(IntermediateStep {
                invocation,
                observation,
            });
        }
        if !errors.is_empty() {
            state.error = Some(errors.join("\n"));
        }
        Ok((state, Next::Continue))
    }
}

//! Errors that end a turn.
//!
//! Everything recoverable (validation, planner parse errors, tool failures) stays inside
//! the graph as `AgentState::error`; only these two escape a run.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// A node could not run at all (planner unreachable, graph misconfigured).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The turn needed more node executions than the recursion limit allows.
    #[error("agent stopped after {limit} steps without reaching an answer")]
    IterationLimitExceeded { limit: usize },
}

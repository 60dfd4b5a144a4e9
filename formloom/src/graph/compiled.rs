//! Compiled state graph: immutable, runs a state from the first node to END.
//!
//! Each node's output fully replaces the state. The run fails with
//! [`AgentError::IterationLimitExceeded`] when it would need more node executions than
//! the recursion limit.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::AgentError;

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state,
};
use super::state_graph::END;
use super::{Next, NextEntry, Node};

#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) first_node_id: String,
    /// Node id → how to pick its successor.
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) recursion_limit: usize,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    fn route(&self, current_id: &str, state: &S, next: Next) -> Option<String> {
        match self.next_map.get(current_id) {
            Some(NextEntry::Conditional(router)) => {
                let target = router.resolve_next(state);
                tracing::debug!(from = %current_id, to = %target, "conditional routing");
                Some(target)
            }
            entry => match next {
                Next::End => None,
                Next::Node(id) => Some(id),
                Next::Continue => match entry {
                    Some(NextEntry::Unconditional(id)) => Some(id.clone()),
                    _ => None,
                },
            },
        }
    }

    /// Runs `state` through the graph and returns the final state.
    ///
    /// - `Next::Continue`: follow the node's edge (no edge ends the run).
    /// - `Next::Node(id)`: run that node next.
    /// - `Next::End`: stop.
    ///
    /// Nodes with conditional edges are routed by their router regardless of `Next`.
    pub async fn invoke(&self, state: S) -> Result<S, AgentError> {
        if !self.nodes.contains_key(&self.first_node_id) {
            return Err(AgentError::ExecutionFailed("empty graph".into()));
        }
        log_graph_start();
        let mut state = state;
        let mut current_id = self.first_node_id.clone();
        let mut steps = 0usize;

        loop {
            if steps >= self.recursion_limit {
                let err = AgentError::IterationLimitExceeded {
                    limit: self.recursion_limit,
                };
                log_graph_error(&err);
                return Err(err);
            }
            let node = self.nodes.get(&current_id).cloned().ok_or_else(|| {
                AgentError::ExecutionFailed(format!("node not found: {}", current_id))
            })?;
            log_node_start(&current_id, steps);
            log_node_state(&current_id, &state);

            let (new_state, next) = match node.run(state).await {
                Ok(output) => output,
                Err(e) => {
                    log_graph_error(&e);
                    return Err(e);
                }
            };
            steps += 1;
            log_node_complete(&current_id, &next);
            state = new_state;

            match self.route(&current_id, &state, next) {
                Some(id) if id != END => current_id = id,
                _ => {
                    log_graph_complete(steps);
                    return Ok(state);
                }
            }
        }
    }
}

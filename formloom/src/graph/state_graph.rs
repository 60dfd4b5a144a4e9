//! Graph builder: nodes, plain edges and conditional edges, validated by `compile`.
//!
//! Cycles are allowed (the form agent loops agent → tool → agent); each run is bounded by
//! the recursion limit instead.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use super::compile_error::CompilationError;
use super::compiled::CompiledStateGraph;
use super::conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
use super::node::Node;

/// Virtual entry node id.
pub const START: &str = "__start__";

/// Virtual exit node id.
pub const END: &str = "__end__";

/// Node executions allowed per run unless overridden.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: Vec<(String, String)>,
    conditional_edges: HashMap<String, ConditionalRouter<S>>,
    recursion_limit: usize,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            conditional_edges: HashMap::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Maximum node executions per run; one more raises `IterationLimitExceeded`.
    pub fn with_recursion_limit(self, recursion_limit: usize) -> Self {
        Self {
            recursion_limit,
            ..self
        }
    }

    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Routes from `source` by `path(state)`, optionally mapped through `path_map`.
    pub fn add_conditional_edges(
        &mut self,
        source: impl Into<String>,
        path: ConditionalRouterFn<S>,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self {
        self.conditional_edges
            .insert(source.into(), ConditionalRouter::new(path, path_map));
        self
    }

    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        for (source, router) in &self.conditional_edges {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            if let Some(path_map) = &router.path_map {
                if let Some(bad) = path_map
                    .values()
                    .find(|t| t.as_str() != END && !self.nodes.contains_key(t.as_str()))
                {
                    return Err(CompilationError::InvalidConditionalPathMap(bad.clone()));
                }
            }
        }

        let mut starts = self
            .edges
            .iter()
            .filter(|(f, _)| f == START)
            .map(|(_, t)| t.clone());
        let first = match (starts.next(), starts.next()) {
            (Some(first), None) => first,
            (None, _) => return Err(CompilationError::MissingStart),
            (Some(_), Some(_)) => {
                return Err(CompilationError::InvalidChain(
                    "multiple edges from START (branch)".into(),
                ))
            }
        };

        let has_end = self.edges.iter().any(|(_, t)| t == END)
            || self.conditional_edges.values().any(|r| {
                r.path_map
                    .as_ref()
                    .map_or(true, |m| m.values().any(|v| v == END))
            });
        if !has_end {
            return Err(CompilationError::MissingEnd);
        }

        let mut next_map: HashMap<String, NextEntry<S>> = HashMap::new();
        let mut seen = HashSet::new();
        for (from, to) in self.edges.iter().filter(|(f, _)| f != START) {
            if !seen.insert(from.clone()) {
                return Err(CompilationError::InvalidChain(format!(
                    "more than one edge from {}",
                    from
                )));
            }
            next_map.insert(from.clone(), NextEntry::Unconditional(to.clone()));
        }
        for (source, router) in self.conditional_edges {
            if next_map.contains_key(&source) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(source));
            }
            next_map.insert(source, NextEntry::Conditional(router));
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            first_node_id: first,
            next_map,
            recursion_limit: self.recursion_limit,
        })
    }
}

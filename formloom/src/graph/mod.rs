//! Small state-graph engine: nodes, edges, conditional routing and a recursion limit.
//!
//! The form agent runs on it with two nodes (`agent`, `tool`); see
//! [`FormAgent`](crate::FormAgent).

mod compile_error;
mod compiled;
mod conditional;
mod logging;
mod next;
mod node;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
pub use next::Next;
pub use node::Node;
pub use state_graph::{StateGraph, DEFAULT_RECURSION_LIMIT, END, START};

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::AgentError;

use super::Next;

/// One step of a graph: state in, (state out, next step).
///
/// **Interaction**: registered with [`StateGraph::add_node`](super::StateGraph::add_node)
/// and driven by [`CompiledStateGraph::invoke`](super::CompiledStateGraph::invoke).
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Unique id within a graph (e.g. `"agent"`, `"tool"`).
    fn id(&self) -> &str;

    async fn run(&self, state: S) -> Result<(S, Next), AgentError>;
}

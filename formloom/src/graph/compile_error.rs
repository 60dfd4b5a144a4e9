use thiserror::Error;

/// Graph structure rejected by [`StateGraph::compile`](super::StateGraph::compile).
#[derive(Debug, Error)]
pub enum CompilationError {
    /// An edge references a node that was never added (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// No edge or conditional route can reach END.
    #[error("graph has no path to END")]
    MissingEnd,

    /// Branching plain edges (several outgoing edges from one node).
    #[error("invalid edges: {0}")]
    InvalidChain(String),

    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),
}

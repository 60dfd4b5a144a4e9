//! What a node asks the runner to do next.

/// Routing hint returned with the node's new state.
///
/// Ignored for nodes with conditional edges: their router decides.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    /// Follow the node's outgoing edge.
    Continue,
    /// Jump to the node with this id.
    Node(String),
    /// Stop the run.
    End,
}

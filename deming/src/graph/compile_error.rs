//! Graph compilation error, returned by `StateGraph::compile`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilationError {
    /// A node id in an edge was not registered via `add_node` (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge leaves START.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// Nothing can reach END.
    #[error("graph must have at least one edge to END")]
    MissingEnd,

    /// Branching plain edges, or a cycle in a graph without conditional edges.
    #[error("edges must form a single linear chain from START to END: {0}")]
    InvalidChain(String),

    /// A node has both an outgoing edge and conditional edges.
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A value in a conditional path_map is not a node id or END.
    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),

    /// A registered node has neither an edge nor conditional edges leaving it.
    #[error("node has no outgoing edge: {0}")]
    MissingOutgoingEdge(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of NodeNotFound contains "node not found" and the node id.
    #[test]
    fn compilation_error_display_node_not_found() {
        let s = CompilationError::NodeNotFound("x".to_string()).to_string();
        assert!(s.contains("node not found"), "{}", s);
        assert!(s.contains("x"), "{}", s);
    }

    #[test]
    fn compilation_error_display_start_and_end() {
        assert!(CompilationError::MissingStart
            .to_string()
            .to_lowercase()
            .contains("start"));
        assert!(CompilationError::MissingEnd
            .to_string()
            .to_lowercase()
            .contains("end"));
    }

    /// **Scenario**: Display of InvalidChain carries the reason.
    #[test]
    fn compilation_error_display_invalid_chain() {
        let s = CompilationError::InvalidChain("cycle detected".to_string()).to_string();
        assert!(s.contains("linear chain"), "{}", s);
        assert!(s.contains("cycle detected"), "{}", s);
    }
}

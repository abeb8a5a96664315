//! Structured logging for graph execution events.

use std::fmt::Debug;

pub fn log_node_start(node_id: &str, step: usize) {
    tracing::debug!(node_id = node_id, step, "Starting node execution");
}

/// Input state of a node; only emitted at trace level.
pub fn log_node_state<S: Debug>(node_id: &str, state: &S) {
    tracing::trace!(node_id = node_id, state = ?state, "Node execution: state");
}

pub fn log_node_complete(node_id: &str, next_id: &str) {
    tracing::debug!(node_id = node_id, next = next_id, "Node execution complete");
}

pub fn log_state_update(node_id: &str) {
    tracing::trace!(node_id = node_id, "State updated");
}

pub fn log_graph_start(recursion_limit: usize) {
    tracing::info!(recursion_limit, "Starting graph execution");
}

pub fn log_graph_complete(steps: usize) {
    tracing::info!(steps, "Graph execution complete");
}

pub fn log_graph_error(error: &crate::error::AgentError) {
    tracing::error!(%error, "Graph execution error");
}

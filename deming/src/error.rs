//! Agent execution error types.
//!
//! Returned by graph nodes and by `CompiledStateGraph::invoke` when a run cannot continue.

use thiserror::Error;

/// Agent execution error.
///
/// Only fatal conditions are errors: step failures reported by the model are carried as
/// feedback in the state, not as `AgentError`.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed, missing input).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Model output for a phase could not be decoded into its structured shape.
    #[error("could not parse {phase} output: {message}")]
    Parse { phase: String, message: String },

    /// The run needed more node executions than the configured step budget.
    #[error("recursion limit of {0} steps reached without hitting END")]
    RecursionLimit(usize),
}

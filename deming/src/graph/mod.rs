//! State graph: nodes, explicit and conditional edges, compile and invoke.
//!
//! Build a `StateGraph`, wire it with `add_edge` / `add_conditional_edges`, `compile()` it,
//! then `invoke` or `stream` with an initial state.

mod compile_error;
mod compiled;
mod conditional;
mod logging;
mod logging_middleware;
mod node;
mod node_middleware;
mod run_context;
mod runnable_config;
mod state_graph;
mod visualization;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
pub use logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_state_update,
};
pub use logging_middleware::LoggingNodeMiddleware;
pub use node::Node;
pub use node_middleware::{NodeMiddleware, NodeRunFn};
pub use run_context::RunContext;
pub use runnable_config::{RunnableConfig, DEFAULT_RECURSION_LIMIT};
pub use state_graph::{StateGraph, END, START};
pub use visualization::{generate_dot, generate_text};

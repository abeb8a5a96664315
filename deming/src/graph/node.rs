//! Graph node trait: one step in a StateGraph.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::AgentError;

use super::RunContext;

/// One step in a graph: state in, state out. Where the run goes next is decided by the
/// node's outgoing edge or conditional router, never by the node itself.
///
/// **Interaction**: registered with `StateGraph::add_node`; driven by
/// `CompiledStateGraph::invoke` and `stream`.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Node id (e.g. `"plan"`, `"check"`). Must be unique within a graph.
    fn id(&self) -> &str;

    async fn run(&self, state: S) -> Result<S, AgentError>;

    /// Variant with the run context (config, managed values such as `is_last_step`).
    ///
    /// Default implementation calls `run` and ignores the context.
    async fn run_with_context(&self, state: S, _ctx: &RunContext<S>) -> Result<S, AgentError> {
        self.run(state).await
    }
}

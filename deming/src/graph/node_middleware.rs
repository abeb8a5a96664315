//! Around-node hook, set via `StateGraph::with_middleware`.

use async_trait::async_trait;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use crate::error::AgentError;

/// The node execution handed to [`NodeMiddleware::around_run`]; call it to run the node.
pub type NodeRunFn<S> =
    Box<dyn FnOnce(S) -> Pin<Box<dyn Future<Output = Result<S, AgentError>> + Send>> + Send>;

/// Wraps every node execution of a compiled graph (e.g. enter / exit logging).
#[async_trait]
pub trait NodeMiddleware<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeRunFn<S>,
    ) -> Result<S, AgentError>;
}

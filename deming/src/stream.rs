//! Streaming types for graph runs.
//!
//! `CompiledStateGraph::stream` sends `StreamEvent`s over a channel; which events are sent is
//! selected by the `StreamMode` set passed in.

use std::fmt::Debug;

use crate::error::AgentError;

/// Which events a streamed run emits.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StreamMode {
    /// Full state after each node completes.
    Values,
    /// Node id plus the merged state after that node.
    Updates,
    /// TaskStart / TaskEnd around each node execution.
    Tasks,
}

/// One event of a streamed run.
#[derive(Clone, Debug)]
pub enum StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Full state snapshot after a node finishes.
    Values(S),
    /// Node id and state after that node.
    Updates { node_id: String, state: S },
    /// A node is about to run.
    TaskStart { node_id: String },
    /// A node finished; `Err` carries the error message when the node failed.
    TaskEnd {
        node_id: String,
        result: Result<(), String>,
    },
    /// The run stopped with an error. Always sent last, whatever modes are selected.
    Failed(AgentError),
}

impl<S> StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Node id for task and update events; `None` for `Values` and `Failed`.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::Values(_) | Self::Failed(_) => None,
            Self::Updates { node_id, .. }
            | Self::TaskStart { node_id }
            | Self::TaskEnd { node_id, .. } => Some(node_id),
        }
    }
}

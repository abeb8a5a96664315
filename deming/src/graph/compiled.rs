//! Compiled state graph: immutable, runs with `invoke` or `stream`.
//!
//! Built by `StateGraph::compile`. The run loop executes one node at a time, takes its output
//! as the new state, then follows the node's conditional router or plain edge. Every run carries
//! a step budget (`RunnableConfig::recursion_limit`).

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::AgentError;
use crate::managed::{IsLastStep, IS_LAST_STEP};
use crate::stream::{StreamEvent, StreamMode};

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_state_update,
};
use super::node_middleware::NodeMiddleware;
use super::state_graph::END;
use super::{NextEntry, Node, RunContext, RunnableConfig};

/// Executable graph. Cheap to clone (nodes are shared).
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Node reached from START.
    pub(super) first_node_id: String,
    /// Node id -> how to pick the next node. Every node has an entry.
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn execute_node(
        &self,
        node: Arc<dyn Node<S>>,
        state: S,
        run_ctx: &RunContext<S>,
    ) -> Result<S, AgentError> {
        match &self.middleware {
            Some(middleware) => {
                let node_id = node.id().to_string();
                let ctx = run_ctx.clone();
                middleware
                    .around_run(
                        &node_id,
                        state,
                        Box::new(move |s| {
                            Box::pin(async move { node.run_with_context(s, &ctx).await })
                        }),
                    )
                    .await
            }
            None => node.run_with_context(state, run_ctx).await,
        }
    }

    /// Next node id (possibly END) after `current_id`, from its router or plain edge.
    fn resolve_next(&self, current_id: &str, state: &S) -> Result<String, AgentError> {
        match self.next_map.get(current_id) {
            Some(NextEntry::Conditional(router)) => {
                let target = router.resolve_next(state);
                tracing::debug!(from = %current_id, to = %target, "conditional routing");
                Ok(target)
            }
            Some(NextEntry::Unconditional(id)) => Ok(id.clone()),
            None => Err(AgentError::ExecutionFailed(format!(
                "no outgoing edge from {}",
                current_id
            ))),
        }
    }

    /// Shared run loop for `invoke` and `stream`.
    async fn run_loop_inner(
        &self,
        state: &mut S,
        current_id: &mut String,
        run_ctx: &RunContext<S>,
    ) -> Result<(), AgentError> {
        let limit = run_ctx.config.recursion_limit;
        log_graph_start(limit);

        let mut step = 0usize;
        loop {
            if step >= limit {
                let err = AgentError::RecursionLimit(limit);
                log_graph_error(&err);
                return Err(err);
            }
            let node = match self.nodes.get(current_id.as_str()) {
                Some(node) => node.clone(),
                None => {
                    let err = AgentError::ExecutionFailed(format!("node not found: {}", current_id));
                    log_graph_error(&err);
                    return Err(err);
                }
            };
            let step_ctx = run_ctx
                .clone()
                .with_managed_value(IS_LAST_STEP, Arc::new(IsLastStep::new(step + 1 == limit)));

            log_node_start(current_id, step);
            log_node_state(current_id, state);

            if step_ctx.wants(StreamMode::Tasks) {
                step_ctx
                    .emit(StreamEvent::TaskStart {
                        node_id: current_id.clone(),
                    })
                    .await;
            }

            let new_state = match self.execute_node(node, state.clone(), &step_ctx).await {
                Ok(output) => output,
                Err(e) => {
                    if step_ctx.wants(StreamMode::Tasks) {
                        step_ctx
                            .emit(StreamEvent::TaskEnd {
                                node_id: current_id.clone(),
                                result: Err(e.to_string()),
                            })
                            .await;
                    }
                    log_graph_error(&e);
                    return Err(e);
                }
            };
            step += 1;

            if step_ctx.wants(StreamMode::Tasks) {
                step_ctx
                    .emit(StreamEvent::TaskEnd {
                        node_id: current_id.clone(),
                        result: Ok(()),
                    })
                    .await;
            }

            *state = new_state;
            log_state_update(current_id);

            if step_ctx.wants(StreamMode::Values) {
                step_ctx.emit(StreamEvent::Values(state.clone())).await;
            }
            if step_ctx.wants(StreamMode::Updates) {
                step_ctx
                    .emit(StreamEvent::Updates {
                        node_id: current_id.clone(),
                        state: state.clone(),
                    })
                    .await;
            }

            let next_id = self.resolve_next(current_id, state).map_err(|e| {
                log_graph_error(&e);
                e
            })?;
            log_node_complete(current_id, &next_id);
            if next_id == END {
                log_graph_complete(step);
                return Ok(());
            }
            *current_id = next_id;
        }
    }

    /// Runs the graph from the first node until END or an error, returning the final state.
    pub async fn invoke(&self, state: S, config: Option<RunnableConfig>) -> Result<S, AgentError> {
        self.invoke_with_context(state, RunContext::new(config.unwrap_or_default()))
            .await
    }

    /// Like `invoke`, with a caller-built `RunContext` (extra managed values, stream sender).
    pub async fn invoke_with_context(
        &self,
        state: S,
        run_ctx: RunContext<S>,
    ) -> Result<S, AgentError> {
        if self.nodes.is_empty() || !self.nodes.contains_key(&self.first_node_id) {
            return Err(AgentError::ExecutionFailed("empty graph".into()));
        }
        let mut state = state;
        let mut current_id = self.first_node_id.clone();
        self.run_loop_inner(&mut state, &mut current_id, &run_ctx)
            .await?;
        Ok(state)
    }

    /// Streams graph execution through a channel-backed stream.
    ///
    /// The run happens on a spawned task; the stream ends when the run ends. A run that stops
    /// with an error (failing node, step budget, routing) ends with `StreamEvent::Failed`,
    /// whatever modes are selected; a failing node is also visible as
    /// `TaskEnd { result: Err(..) }` when `StreamMode::Tasks` is selected.
    pub fn stream(
        &self,
        state: S,
        config: Option<RunnableConfig>,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent<S>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let mode_set: HashSet<StreamMode> = stream_mode.into();

        tokio::spawn(async move {
            let mut run_ctx = RunContext::new(config.unwrap_or_default());
            run_ctx.stream_tx = Some(tx);
            run_ctx.stream_mode = mode_set;
            if !graph.nodes.contains_key(&graph.first_node_id) {
                run_ctx
                    .emit(StreamEvent::Failed(AgentError::ExecutionFailed(
                        "empty graph".into(),
                    )))
                    .await;
                return;
            }
            let mut state = state;
            let mut current_id = graph.first_node_id.clone();

            if let Err(error) = graph
                .run_loop_inner(&mut state, &mut current_id, &run_ctx)
                .await
            {
                run_ctx.emit(StreamEvent::Failed(error)).await;
            }
        });

        ReceiverStream::new(rx)
    }

    /// Node ids, sorted.
    pub fn node_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.nodes.keys().cloned().collect();
        ids.sort();
        ids
    }
}

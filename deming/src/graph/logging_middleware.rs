//! Middleware that logs node enter / exit with elapsed time.

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Instant;

use crate::error::AgentError;

use super::{NodeMiddleware, NodeRunFn};

/// Logs each node execution through `tracing` (target `deming::node`).
pub struct LoggingNodeMiddleware<S> {
    _phantom: std::marker::PhantomData<S>,
}

impl<S> Default for LoggingNodeMiddleware<S> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<S> NodeMiddleware<S> for LoggingNodeMiddleware<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeRunFn<S>,
    ) -> Result<S, AgentError> {
        tracing::info!(target: "deming::node", node = node_id, "enter");
        let started = Instant::now();
        let result = inner(state).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::info!(target: "deming::node", node = node_id, elapsed_ms, "exit"),
            Err(e) => {
                tracing::warn!(target: "deming::node", node = node_id, error = %e, elapsed_ms, "exit")
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: the middleware calls the inner execution and passes its result through.
    #[tokio::test]
    async fn around_run_passes_result_through() {
        let mw = LoggingNodeMiddleware::<i32>::default();
        let out = mw
            .around_run("add", 1, Box::new(|s| Box::pin(async move { Ok(s + 1) })))
            .await
            .unwrap();
        assert_eq!(out, 2);

        let err = mw
            .around_run(
                "fail",
                1,
                Box::new(|_| {
                    Box::pin(async move { Err(AgentError::ExecutionFailed("nope".into())) })
                }),
            )
            .await;
        assert!(matches!(err, Err(AgentError::ExecutionFailed(_))));
    }
}

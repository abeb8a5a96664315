//! Run context passed into nodes.
//!
//! Holds the runnable config, the optional stream sender and selected modes, and managed
//! values refreshed by the run loop before every node execution.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::managed::{ManagedValue, IS_LAST_STEP};
use crate::stream::{StreamEvent, StreamMode};

use super::RunnableConfig;

#[derive(Clone)]
pub struct RunContext<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub config: RunnableConfig,
    /// Sender for streaming events; `None` for plain `invoke`.
    pub stream_tx: Option<mpsc::Sender<StreamEvent<S>>>,
    pub stream_mode: HashSet<StreamMode>,
    /// Managed values (e.g. `is_last_step`) keyed by name.
    pub managed_values: HashMap<String, Arc<dyn ManagedValue<Value, S>>>,
}

impl<S> RunContext<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new(config: RunnableConfig) -> Self {
        Self {
            config,
            stream_tx: None,
            stream_mode: HashSet::new(),
            managed_values: HashMap::new(),
        }
    }

    /// Gets a managed value by name, `None` when not registered.
    pub fn get_managed_value(&self, name: &str) -> Option<Value> {
        self.managed_values.get(name).map(|mv| mv.get(self))
    }

    pub fn with_managed_value(
        mut self,
        name: impl Into<String>,
        value: Arc<dyn ManagedValue<Value, S>>,
    ) -> Self {
        self.managed_values.insert(name.into(), value);
        self
    }

    /// True when the current node execution is the last one the step budget allows.
    pub fn is_last_step(&self) -> bool {
        self.get_managed_value(IS_LAST_STEP)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub(super) fn wants(&self, mode: StreamMode) -> bool {
        self.stream_tx.is_some() && self.stream_mode.contains(&mode)
    }

    /// Sends an event when a stream is attached; a dropped receiver is ignored.
    pub(super) async fn emit(&self, event: StreamEvent<S>) {
        if let Some(tx) = &self.stream_tx {
            let _ = tx.send(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managed::IsLastStep;

    #[test]
    fn is_last_step_defaults_to_false() {
        let ctx = RunContext::<i32>::new(RunnableConfig::default());
        assert!(!ctx.is_last_step());
        assert!(ctx.get_managed_value(IS_LAST_STEP).is_none());
    }

    #[test]
    fn is_last_step_reads_managed_value() {
        let ctx = RunContext::<i32>::new(RunnableConfig::default())
            .with_managed_value(IS_LAST_STEP, Arc::new(IsLastStep::new(true)));
        assert!(ctx.is_last_step());
    }

    #[test]
    fn wants_requires_sender_and_mode() {
        let mut ctx = RunContext::<i32>::new(RunnableConfig::default());
        ctx.stream_mode.insert(StreamMode::Tasks);
        assert!(!ctx.wants(StreamMode::Tasks));
        let (tx, _rx) = mpsc::channel(1);
        ctx.stream_tx = Some(tx);
        assert!(ctx.wants(StreamMode::Tasks));
        assert!(!ctx.wants(StreamMode::Values));
    }
}

//! Managed values: runtime information computed by the graph run loop rather than stored in
//! the state. `IsLastStep` tells a node it is the last execution the step budget allows.

use std::fmt::Debug;

use crate::graph::RunContext;

/// Registry key under which the run loop publishes [`IsLastStep`].
pub const IS_LAST_STEP: &str = "is_last_step";

/// Value computed during graph execution and exposed to nodes through `RunContext`.
pub trait ManagedValue<T, S>: Send + Sync
where
    T: Clone + Send + Sync + Debug + 'static,
    S: Clone + Send + Sync + Debug + 'static,
{
    fn get(&self, context: &RunContext<S>) -> T;
}

/// Whether the current node execution is the last one permitted by `recursion_limit`.
#[derive(Debug, Clone)]
pub struct IsLastStep {
    is_last: bool,
}

impl IsLastStep {
    pub fn new(is_last: bool) -> Self {
        Self { is_last }
    }

    pub fn value(&self) -> bool {
        self.is_last
    }
}

impl<S> ManagedValue<bool, S> for IsLastStep
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn get(&self, _context: &RunContext<S>) -> bool {
        self.is_last
    }
}

// RunContext stores managed values type-erased as JSON.
impl<S> ManagedValue<serde_json::Value, S> for IsLastStep
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn get(&self, _context: &RunContext<S>) -> serde_json::Value {
        serde_json::Value::Bool(self.is_last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RunnableConfig;

    #[test]
    fn is_last_step_reports_its_flag() {
        let context = RunContext::<String>::new(RunnableConfig::default());
        let last = IsLastStep::new(true);
        let value: bool = <IsLastStep as ManagedValue<bool, String>>::get(&last, &context);
        assert!(value);
        assert!(last.value());

        let not_last = IsLastStep::new(false);
        let json: serde_json::Value =
            <IsLastStep as ManagedValue<serde_json::Value, String>>::get(&not_last, &context);
        assert_eq!(json, serde_json::Value::Bool(false));
    }
}

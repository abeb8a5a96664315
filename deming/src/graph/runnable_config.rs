//! Per-run configuration.

/// Default number of node executions a run may take before failing.
pub const DEFAULT_RECURSION_LIMIT: usize = 100;

/// Config for one `invoke` / `stream` call.
#[derive(Debug, Clone)]
pub struct RunnableConfig {
    /// Maximum node executions for the run. The last permitted execution sees
    /// `RunContext::is_last_step() == true`; going beyond fails with `RecursionLimit`.
    pub recursion_limit: usize,
}

impl Default for RunnableConfig {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl RunnableConfig {
    pub fn with_recursion_limit(recursion_limit: usize) -> Self {
        Self { recursion_limit }
    }
}

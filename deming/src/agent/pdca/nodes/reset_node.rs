//! Reset node (`clean_vars`): clear the per-step fields before planning again.

use async_trait::async_trait;

use crate::agent::pdca::phase::Phase;
use crate::agent::pdca::state::{clean_step_vars, CycleState};
use crate::error::AgentError;
use crate::graph::Node;

pub struct ResetNode;

#[async_trait]
impl Node<CycleState> for ResetNode {
    fn id(&self) -> &str {
        Phase::Reset.as_str()
    }

    async fn run(&self, state: CycleState) -> Result<CycleState, AgentError> {
        tracing::debug!(
            processed = state.already_processed_steps.len(),
            status = ?state.current_status,
            "reset step"
        );
        Ok(state.with_update(clean_step_vars()))
    }
}

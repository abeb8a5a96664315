//! Plan node: derive the task on first entry, ask the model for a step queue, replace
//! `next_steps` with it.

use async_trait::async_trait;

use crate::agent::pdca::model_call::PhaseModel;
use crate::agent::pdca::phase::Phase;
use crate::agent::pdca::prompts::{render, PLAN_FORMAT_INSTRUCTIONS, PLAN_PROMPT};
use crate::agent::pdca::state::{CycleState, CycleUpdate};
use crate::agent::pdca::structured::{decode_plan, PlanningOutput};
use crate::error::AgentError;
use crate::graph::Node;

pub struct PlanNode {
    model: PhaseModel,
}

impl PlanNode {
    pub fn new(model: PhaseModel) -> Self {
        Self { model }
    }
}

pub fn plan_prompt(state: &CycleState) -> String {
    let previous_steps = state.processed_step_names();
    render(
        PLAN_PROMPT,
        &[
            ("context", state.context.as_deref()),
            (
                "previous_steps",
                Some(previous_steps.as_str()).filter(|s| !s.is_empty()),
            ),
            ("format_instructions", Some(PLAN_FORMAT_INSTRUCTIONS)),
        ],
    )
}

/// The new plan replaces the queue wholesale.
pub fn plan_update(output: PlanningOutput) -> CycleUpdate {
    CycleUpdate {
        next_steps: Some(output.next_steps),
        planning_feedback: Some(output.feedback.filter(|f| !f.trim().is_empty())),
        current_phase: Some(Phase::Plan),
        ..CycleUpdate::default()
    }
}

#[async_trait]
impl Node<CycleState> for PlanNode {
    fn id(&self) -> &str {
        Phase::Plan.as_str()
    }

    async fn run(&self, state: CycleState) -> Result<CycleState, AgentError> {
        let mut state = state;
        if state.task_description.is_none() {
            let task = state
                .first_user_message()
                .map(str::to_string)
                .ok_or_else(|| AgentError::ExecutionFailed("no user message to plan from".into()))?;
            state.apply(CycleUpdate {
                task_description: Some(task),
                ..CycleUpdate::default()
            });
        }

        let response = self
            .model
            .call(Phase::Plan, &state, plan_prompt(&state), &[])
            .await?;
        let output = decode_plan(&response.content)?;
        tracing::debug!(
            steps = output.next_steps.len(),
            first = %output.next_steps[0].name,
            processed = state.already_processed_steps.len(),
            "plan"
        );
        Ok(state.with_update(plan_update(output)))
    }
}

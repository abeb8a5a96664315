//! Do node: execute the step in flight, optionally asking for a web search first.
//!
//! A reply with tool calls hands control to the Tools node and does not count as an attempt.
//! A reply without tool calls ends the attempt: its result and obstacles are stored and
//! `n_retries` goes up by one. When the step budget is on its last node and the model still
//! asks for a tool, the attempt ends with [`STEP_BUDGET_APOLOGY`] as its result.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::pdca::model_call::PhaseModel;
use crate::agent::pdca::phase::Phase;
use crate::agent::pdca::prompts::{render, DO_FORMAT_INSTRUCTIONS, DO_PROMPT};
use crate::agent::pdca::state::{CycleState, CycleUpdate, Step};
use crate::agent::pdca::structured::{decode, DoingOutput};
use crate::error::AgentError;
use crate::graph::{Node, RunContext};
use crate::state::ToolCall;
use crate::tool_source::{ToolSource, ToolSpec};

use super::feedback_text;

/// Step result used when the step budget runs out while a search is pending.
pub const STEP_BUDGET_APOLOGY: &str =
    "Sorry, I could not find an answer to your question in the specified number of steps.";

pub struct DoNode {
    model: PhaseModel,
    tools: Arc<dyn ToolSource>,
}

impl DoNode {
    pub fn new(model: PhaseModel, tools: Arc<dyn ToolSource>) -> Self {
        Self { model, tools }
    }

    /// Tools offered on this call: none once the attempt used up its search rounds.
    async fn offered_tools(&self, state: &CycleState) -> Vec<ToolSpec> {
        if state.tool_rounds >= self.model.config().max_tool_rounds {
            return Vec::new();
        }
        match self.tools.list_tools().await {
            Ok(specs) => specs,
            Err(e) => {
                tracing::warn!(error = %e, "listing tools failed; continuing without search");
                Vec::new()
            }
        }
    }
}

fn search_results_text(state: &CycleState) -> Option<String> {
    if state.tool_results.is_empty() {
        return None;
    }
    Some(
        state
            .tool_results
            .iter()
            .map(|r| r.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"),
    )
}

pub fn do_prompt(state: &CycleState, step: &Step) -> String {
    let previous_feedback = feedback_text(state.feedback.as_ref());
    let search_results = search_results_text(state);
    render(
        DO_PROMPT,
        &[
            ("current_step", Some(step.name.as_str())),
            ("step_details", Some(step.details.as_str())),
            ("step_expected_outcome", Some(step.expected_outcome.as_str())),
            ("context", state.context.as_deref()),
            ("previous_feedback", previous_feedback.as_deref()),
            ("planning_feedback", state.planning_feedback.as_deref()),
            ("search_results", search_results.as_deref()),
            ("format_instructions", Some(DO_FORMAT_INSTRUCTIONS)),
        ],
    )
}

/// The model asked for tools: hand them to the Tools node. Not an attempt.
pub fn tool_request_update(tool_calls: Vec<ToolCall>, is_last_step: bool) -> CycleUpdate {
    CycleUpdate {
        tool_calls: Some(tool_calls),
        step_search_triggered: Some(true),
        current_phase: Some(Phase::Do),
        is_last_step: Some(is_last_step),
        ..CycleUpdate::default()
    }
}

/// Clears what belongs to a single attempt once it ends.
fn end_attempt(state: &CycleState, update: CycleUpdate) -> CycleUpdate {
    CycleUpdate {
        n_retries: Some(state.n_retries + 1),
        tool_calls: Some(Vec::new()),
        tool_results: Some(Vec::new()),
        tool_rounds: Some(0),
        step_search_triggered: Some(false),
        current_phase: Some(Phase::Do),
        ..update
    }
}

/// The attempt finished with a decoded result.
pub fn done_update(state: &CycleState, output: DoingOutput, is_last_step: bool) -> CycleUpdate {
    end_attempt(
        state,
        CycleUpdate {
            step_results: Some(Some(output.result)),
            step_obstacles: Some(output.obstacles.filter(|o| !o.trim().is_empty())),
            is_last_step: Some(is_last_step),
            ..CycleUpdate::default()
        },
    )
}

/// The step budget ran out while the model still wanted a search.
pub fn apology_update(state: &CycleState) -> CycleUpdate {
    end_attempt(
        state,
        CycleUpdate {
            step_results: Some(Some(STEP_BUDGET_APOLOGY.to_string())),
            step_obstacles: Some(None),
            is_last_step: Some(true),
            ..CycleUpdate::default()
        },
    )
}

#[async_trait]
impl Node<CycleState> for DoNode {
    fn id(&self) -> &str {
        Phase::Do.as_str()
    }

    async fn run(&self, state: CycleState) -> Result<CycleState, AgentError> {
        self.run_with_context(state, &RunContext::new(Default::default()))
            .await
    }

    async fn run_with_context(
        &self,
        state: CycleState,
        ctx: &RunContext<CycleState>,
    ) -> Result<CycleState, AgentError> {
        let step = state
            .current_step()
            .cloned()
            .ok_or_else(|| AgentError::ExecutionFailed("no step in flight".into()))?;
        let is_last_step = ctx.is_last_step();
        let tools = self.offered_tools(&state).await;
        tracing::debug!(
            step = %step.name,
            n_retries = state.n_retries,
            tool_rounds = state.tool_rounds,
            tools_offered = !tools.is_empty(),
            is_last_step,
            "do"
        );

        let response = self
            .model
            .call(Phase::Do, &state, do_prompt(&state, &step), &tools)
            .await?;

        let update = if !response.tool_calls.is_empty() {
            if is_last_step {
                tracing::warn!(step = %step.name, "step budget exhausted with a pending search");
                apology_update(&state)
            } else {
                tool_request_update(response.tool_calls, is_last_step)
            }
        } else {
            let output: DoingOutput = decode(Phase::Do, &response.content)?;
            done_update(&state, output, is_last_step)
        };
        Ok(state.with_update(update))
    }
}

//! Act node: judge how far the whole task is from done and rewrite the running answer.

use async_trait::async_trait;

use crate::agent::pdca::model_call::PhaseModel;
use crate::agent::pdca::phase::Phase;
use crate::agent::pdca::prompts::{render, ACT_FORMAT_INSTRUCTIONS, ACT_PROMPT};
use crate::agent::pdca::state::{CycleState, CycleUpdate};
use crate::agent::pdca::structured::{decode, ActingOutput};
use crate::error::AgentError;
use crate::graph::Node;

pub struct ActNode {
    model: PhaseModel,
}

impl ActNode {
    pub fn new(model: PhaseModel) -> Self {
        Self { model }
    }
}

pub fn act_prompt(state: &CycleState) -> String {
    let success = state.success.to_string();
    let feedback = state.feedback.as_ref();
    render(
        ACT_PROMPT,
        &[
            ("success", Some(success.as_str())),
            ("comments", feedback.map(|f| f.comments.as_str())),
            ("suggestions", feedback.and_then(|f| f.suggestions.as_deref())),
            ("context", state.context.as_deref()),
            ("result", state.results.as_deref()),
            ("step_result", state.step_results.as_deref()),
            ("task_description", state.task_description.as_deref()),
            ("format_instructions", Some(ACT_FORMAT_INSTRUCTIONS)),
        ],
    )
}

/// Only phase that writes `results`. A step that reaches Act without passing Check counts as
/// an exhausted retry.
pub fn act_update(state: &CycleState, output: ActingOutput) -> CycleUpdate {
    CycleUpdate {
        exhausted_retries: Some(state.exhausted_retries + u32::from(!state.success)),
        current_status: Some(output.current_status),
        context: Some(output.context),
        results: Some(output.result),
        current_phase: Some(Phase::Act),
        ..CycleUpdate::default()
    }
}

#[async_trait]
impl Node<CycleState> for ActNode {
    fn id(&self) -> &str {
        Phase::Act.as_str()
    }

    async fn run(&self, state: CycleState) -> Result<CycleState, AgentError> {
        if !state.success {
            tracing::info!(
                n_retries = state.n_retries,
                "step forwarded to act without passing check"
            );
        }
        let response = self
            .model
            .call(Phase::Act, &state, act_prompt(&state), &[])
            .await?;
        let output: ActingOutput = decode(Phase::Act, &response.content)?;
        tracing::debug!(status = %output.current_status, "act");
        let update = act_update(&state, output);
        Ok(state.with_update(update))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::agent::pdca::config::PdcaConfig;
    use crate::agent::pdca::state::{CycleStatus, Feedback};
    use crate::llm::MockLlm;

    #[tokio::test]
    async fn act_sets_status_context_and_results() {
        let llm = Arc::new(MockLlm::with_no_tool_calls(
            r#"{"current_status": "completed", "context": "answered", "result": "Montevideo"}"#,
        ));
        let node = ActNode::new(PhaseModel::new(llm.clone(), Arc::new(PdcaConfig::default())));
        let state = CycleState {
            task_description: Some("capital of Uruguay".into()),
            success: false,
            feedback: Some(Feedback {
                success: false,
                comments: "still unverified".into(),
                suggestions: None,
            }),
            step_results: Some("Montevideo?".into()),
            ..CycleState::new("capital of Uruguay")
        };
        let out = node.run(state).await.unwrap();
        assert_eq!(out.current_status, Some(CycleStatus::Completed));
        assert_eq!(out.context.as_deref(), Some("answered"));
        assert_eq!(out.results.as_deref(), Some("Montevideo"));
        assert_eq!(out.exhausted_retries, 1);

        let prompt = llm.calls()[0].human_prompt().to_string();
        assert!(prompt.contains("successful: false"), "{}", prompt);
        assert!(prompt.contains("still unverified"), "{}", prompt);
        assert!(prompt.contains("Montevideo?"));
        assert!(prompt.contains("\"capital of Uruguay\""));
    }

    #[tokio::test]
    async fn unknown_status_is_fatal() {
        let llm = Arc::new(MockLlm::with_no_tool_calls(
            r#"{"current_status": "halfway", "context": "", "result": ""}"#,
        ));
        let node = ActNode::new(PhaseModel::new(llm, Arc::new(PdcaConfig::default())));
        let err = node.run(CycleState::new("t")).await.unwrap_err();
        assert!(matches!(err, AgentError::Parse { .. }));
    }
}

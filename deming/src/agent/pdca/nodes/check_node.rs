//! Check node: judge the attempt and record the evaluated step in the history.

use async_trait::async_trait;

use crate::agent::pdca::model_call::PhaseModel;
use crate::agent::pdca::phase::Phase;
use crate::agent::pdca::prompts::{render, CHECK_FORMAT_INSTRUCTIONS, CHECK_PROMPT};
use crate::agent::pdca::state::{CycleState, CycleUpdate, Feedback, Step};
use crate::agent::pdca::structured::{decode, CheckingOutput};
use crate::error::AgentError;
use crate::graph::Node;

use super::feedback_text;

pub struct CheckNode {
    model: PhaseModel,
}

impl CheckNode {
    pub fn new(model: PhaseModel) -> Self {
        Self { model }
    }
}

pub fn check_prompt(state: &CycleState, step: &Step) -> String {
    let previous_feedback = feedback_text(state.feedback.as_ref());
    render(
        CHECK_PROMPT,
        &[
            ("current_step", Some(step.name.as_str())),
            ("step_results", state.step_results.as_deref()),
            ("results", state.results.as_deref()),
            ("obstacles", state.step_obstacles.as_deref()),
            ("context", state.context.as_deref()),
            ("previous_feedback", previous_feedback.as_deref()),
            ("format_instructions", Some(CHECK_FORMAT_INSTRUCTIONS)),
        ],
    )
}

/// Stores the verdict and appends exactly one history entry. Never touches `results`.
pub fn check_update(step: Step, output: CheckingOutput) -> CycleUpdate {
    CycleUpdate {
        success: Some(output.success),
        feedback: Some(Some(Feedback {
            success: output.success,
            comments: output.comments,
            suggestions: output.suggestions.filter(|s| !s.trim().is_empty()),
        })),
        processed_steps: vec![step],
        current_phase: Some(Phase::Check),
        ..CycleUpdate::default()
    }
}

#[async_trait]
impl Node<CycleState> for CheckNode {
    fn id(&self) -> &str {
        Phase::Check.as_str()
    }

    async fn run(&self, state: CycleState) -> Result<CycleState, AgentError> {
        let step = state
            .current_step()
            .cloned()
            .ok_or_else(|| AgentError::ExecutionFailed("no step to check".into()))?;
        let response = self
            .model
            .call(Phase::Check, &state, check_prompt(&state, &step), &[])
            .await?;
        let output: CheckingOutput = decode(Phase::Check, &response.content)?;
        tracing::debug!(
            step = %step.name,
            success = output.success,
            n_retries = state.n_retries,
            "check"
        );
        Ok(state.with_update(check_update(step, output)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::agent::pdca::config::PdcaConfig;
    use crate::llm::MockLlm;

    fn node(llm: Arc<MockLlm>) -> CheckNode {
        CheckNode::new(PhaseModel::new(llm, Arc::new(PdcaConfig::default())))
    }

    fn attempted() -> CycleState {
        CycleState {
            task_description: Some("t".into()),
            next_steps: vec![Step::new("Search the capital", "", "a city")],
            step_results: Some("Montevideo".into()),
            step_obstacles: Some("one source only".into()),
            results: Some("draft answer".into()),
            n_retries: 1,
            ..CycleState::new("t")
        }
    }

    /// **Scenario**: each Check grows the history by exactly one entry and leaves results alone.
    #[tokio::test]
    async fn check_appends_one_step_and_keeps_results() {
        let llm = Arc::new(MockLlm::with_no_tool_calls(
            r#"{"success": false, "comments": "needs a source", "suggestions": "cite one"}"#,
        ));
        let out = node(llm.clone()).run(attempted()).await.unwrap();
        assert_eq!(out.already_processed_steps.len(), 1);
        assert_eq!(out.already_processed_steps[0].name, "Search the capital");
        assert!(!out.success);
        let feedback = out.feedback.as_ref().unwrap();
        assert_eq!(feedback.comments, "needs a source");
        assert_eq!(feedback.suggestions.as_deref(), Some("cite one"));
        assert_eq!(out.results.as_deref(), Some("draft answer"));

        let again = node(llm).run(out).await.unwrap();
        assert_eq!(again.already_processed_steps.len(), 2);
    }

    #[tokio::test]
    async fn check_prompt_names_the_step_and_its_results() {
        let llm = Arc::new(MockLlm::with_no_tool_calls(
            r#"{"success": true, "comments": "ok"}"#,
        ));
        let out = node(llm.clone()).run(attempted()).await.unwrap();
        assert!(out.success);
        let prompt = llm.calls()[0].human_prompt().to_string();
        assert!(prompt.contains("\"Search the capital\""), "{}", prompt);
        assert!(prompt.contains("Montevideo"));
        assert!(prompt.contains("one source only"));
        assert!(prompt.contains("draft answer"));
    }

    #[tokio::test]
    async fn malformed_verdict_is_fatal() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("looks fine to me"));
        let err = node(llm).run(attempted()).await.unwrap_err();
        assert!(matches!(err, AgentError::Parse { .. }));
    }
}

//! Final answer node: turn the accumulated results into the Markdown answer.

use async_trait::async_trait;

use crate::agent::pdca::model_call::PhaseModel;
use crate::agent::pdca::phase::Phase;
use crate::agent::pdca::prompts::{render, FINAL_ANSWER_PROMPT};
use crate::agent::pdca::state::{CycleState, CycleUpdate};
use crate::error::AgentError;
use crate::graph::Node;

pub struct FinalAnswerNode {
    model: PhaseModel,
}

impl FinalAnswerNode {
    pub fn new(model: PhaseModel) -> Self {
        Self { model }
    }
}

pub fn final_answer_prompt(state: &CycleState) -> String {
    render(
        FINAL_ANSWER_PROMPT,
        &[
            ("task_description", state.task_description.as_deref()),
            ("current_result", state.results.as_deref()),
        ],
    )
}

#[async_trait]
impl Node<CycleState> for FinalAnswerNode {
    fn id(&self) -> &str {
        Phase::Finalize.as_str()
    }

    async fn run(&self, state: CycleState) -> Result<CycleState, AgentError> {
        let response = self
            .model
            .call(Phase::Finalize, &state, final_answer_prompt(&state), &[])
            .await?;
        let update = CycleUpdate {
            final_answer: Some(response.content.trim().to_string()),
            current_phase: Some(Phase::Finalize),
            ..CycleUpdate::default()
        };
        Ok(state.with_update(update))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::agent::pdca::config::PdcaConfig;
    use crate::llm::MockLlm;

    #[tokio::test]
    async fn raw_markdown_becomes_the_final_answer() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("\n# Capital\n\nMontevideo.\n"));
        let node = FinalAnswerNode::new(PhaseModel::new(llm.clone(), Arc::new(PdcaConfig::default())));
        let state = CycleState {
            task_description: Some("capital of Uruguay".into()),
            results: Some("Montevideo".into()),
            ..CycleState::new("capital of Uruguay")
        };
        let out = node.run(state).await.unwrap();
        assert_eq!(out.final_answer.as_deref(), Some("# Capital\n\nMontevideo."));
        let prompt = llm.calls()[0].human_prompt().to_string();
        assert!(prompt.contains("\"capital of Uruguay\""));
        assert!(prompt.contains("\"Montevideo\""));
    }
}

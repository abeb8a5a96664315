//! Builds the system + human message pair for a phase and calls the model.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;
use crate::tool_source::ToolSpec;

use super::config::PdcaConfig;
use super::phase::Phase;
use super::prompts::{render, AVAILABLE_TOOLS};
use super::state::CycleState;

/// Model handle shared by the phase nodes.
#[derive(Clone)]
pub struct PhaseModel {
    llm: Arc<dyn LlmClient>,
    config: Arc<PdcaConfig>,
}

impl PhaseModel {
    pub fn new(llm: Arc<dyn LlmClient>, config: Arc<PdcaConfig>) -> Self {
        Self { llm, config }
    }

    pub fn config(&self) -> &PdcaConfig {
        &self.config
    }

    /// Renders the system prompt for `phase` from the state.
    pub fn system_prompt(&self, phase: Phase, state: &CycleState) -> String {
        let system_time = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        render(
            &self.config.system_prompt,
            &[
                ("phase", Some(phase.label())),
                ("task_description", state.task_description.as_deref()),
                ("context", state.context.as_deref()),
                ("system_time", Some(system_time.as_str())),
                (
                    "previous_feedback",
                    state.feedback.as_ref().map(|f| f.comments.as_str()),
                ),
                ("available_tools", Some(AVAILABLE_TOOLS)),
            ],
        )
    }

    pub fn messages(&self, phase: Phase, state: &CycleState, human: String) -> Vec<Message> {
        vec![
            Message::system(self.system_prompt(phase, state)),
            Message::user(human),
        ]
    }

    /// One completion for `phase`. `tools` is empty when the phase offers none.
    pub async fn call(
        &self,
        phase: Phase,
        state: &CycleState,
        human: String,
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        let messages = self.messages(phase, state, human);
        tracing::trace!(phase = %phase, prompt = %messages[1].content(), "phase prompt");
        let response = if tools.is_empty() {
            self.llm.invoke(&messages).await?
        } else {
            self.llm.invoke_with_tools(&messages, tools).await?
        };
        tracing::trace!(phase = %phase, content = %response.content, "phase response");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::pdca::state::Feedback;
    use crate::llm::MockLlm;

    #[test]
    fn system_prompt_carries_phase_task_and_feedback() {
        let model = PhaseModel::new(
            Arc::new(MockLlm::with_no_tool_calls("")),
            Arc::new(PdcaConfig::default()),
        );
        let state = CycleState {
            task_description: Some("Find the capital of Uruguay".into()),
            feedback: Some(Feedback {
                success: false,
                comments: "missing source".into(),
                suggestions: None,
            }),
            ..CycleState::new("Find the capital of Uruguay")
        };
        let prompt = model.system_prompt(Phase::Check, &state);
        assert!(prompt.contains("**Current phase: Check**"), "{}", prompt);
        assert!(prompt.contains("Find the capital of Uruguay"));
        assert!(prompt.contains("missing source"));
        assert!(prompt.contains("\"None\""), "unset context renders as None");
        assert!(prompt.contains("web search"));
    }

    #[tokio::test]
    async fn call_offers_tools_only_when_given() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("{}"));
        let model = PhaseModel::new(llm.clone(), Arc::new(PdcaConfig::default()));
        let state = CycleState::new("t");
        let spec = crate::tools::search_tool_spec();
        model
            .call(Phase::Do, &state, "human".into(), std::slice::from_ref(&spec))
            .await
            .unwrap();
        model
            .call(Phase::Check, &state, "human".into(), &[])
            .await
            .unwrap();
        let calls = llm.calls();
        assert_eq!(calls[0].tools, vec!["search".to_string()]);
        assert!(calls[1].tools.is_empty());
        assert_eq!(calls[1].human_prompt(), "human");
    }
}

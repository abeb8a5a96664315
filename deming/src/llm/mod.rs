//! LLM client abstraction used by every PDCA phase.
//!
//! A phase sends a system + human message pair and gets back assistant text and, for the Do
//! phase, optional tool calls. `ChatOpenAI` talks to an OpenAI-compatible endpoint;
//! `MockLlm` is scripted for tests.

mod mock;
mod model_id;
mod openai;

pub use mock::{MockCall, MockLlm};
pub use model_id::{ModelId, ModelIdError, DEFAULT_PROVIDER};
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;
use crate::state::ToolCall;
use crate::tool_source::ToolSpec;

/// Tool choice mode when tools are offered: the model may choose (auto), must not call
/// (none), or must call (required).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolChoiceMode {
    #[default]
    Auto,
    None,
    Required,
}

impl std::str::FromStr for ToolChoiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "required" => Ok(Self::Required),
            _ => Err(format!(
                "unknown tool_choice: {} (use auto, none, or required)",
                s
            )),
        }
    }
}

/// Token usage for one LLM call.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from one completion: assistant text and requested tool calls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmResponse {
    pub content: String,
    /// Empty when the model answered without requesting a tool.
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<LlmUsage>,
}

impl LlmResponse {
    /// Plain text response without tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Response that only requests tools.
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::default()
        }
    }
}

/// LLM client: messages in, assistant text and optional tool calls out.
///
/// **Interaction**: held as `Arc<dyn LlmClient>` by the phase nodes.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One completion without tools.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;

    /// One completion with `tools` bound for this call only. An empty slice means no tools.
    ///
    /// Default implementation ignores the tools and calls `invoke`.
    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        let _ = tools;
        self.invoke(messages).await
    }
}

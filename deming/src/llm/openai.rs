//! OpenAI Chat Completions client (async-openai).
//!
//! Works with any OpenAI-compatible endpoint through the API base URL. Tools are bound per
//! call by `invoke_with_tools`, so the Do phase can offer search on one attempt and withhold
//! it on the next.

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage, ToolChoiceMode};
use crate::message::Message;
use crate::state::ToolCall;
use crate::tool_source::ToolSpec;

use async_openai::{
    config::{Config, OpenAIConfig},
    types::chat::{
        ChatCompletionMessageToolCalls, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage, ChatCompletionTool,
        ChatCompletionToolChoiceOption, ChatCompletionTools, CreateChatCompletionRequestArgs,
        FunctionObject, ToolChoiceOptions,
    },
    Client,
};

/// OpenAI Chat Completions client implementing `LlmClient`.
///
/// **Interaction**: built by `agent::pdca::build_llm` from `PdcaConfig`; shared by all phases.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    api_base: String,
    temperature: Option<f32>,
    tool_choice: ToolChoiceMode,
}

impl ChatOpenAI {
    /// Client with default config (`OPENAI_API_KEY` from the environment).
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new(), model)
    }

    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        let api_base = config.api_base().to_string();
        Self {
            client: Client::with_config(config),
            model: model.into(),
            api_base,
            temperature: None,
            tool_choice: ToolChoiceMode::Auto,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Tool choice used when tools are offered (default `Auto`).
    pub fn with_tool_choice(mut self, mode: ToolChoiceMode) -> Self {
        self.tool_choice = mode;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn messages_to_request(messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|m| match m {
                Message::System(s) => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(s.as_str()),
                ),
                Message::User(s) => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(s.as_str()),
                ),
                Message::Assistant(s) => ChatCompletionRequestMessage::Assistant(s.as_str().into()),
            })
            .collect()
    }

    fn tools_to_request(tools: &[ToolSpec]) -> Vec<ChatCompletionTools> {
        tools
            .iter()
            .map(|t| {
                ChatCompletionTools::Function(ChatCompletionTool {
                    function: FunctionObject {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: Some(t.input_schema.clone()),
                        ..Default::default()
                    },
                })
            })
            .collect()
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::messages_to_request(messages));

        if !tools.is_empty() {
            args.tools(Self::tools_to_request(tools));
            let opt = match self.tool_choice {
                ToolChoiceMode::Auto => ToolChoiceOptions::Auto,
                ToolChoiceMode::None => ToolChoiceOptions::None,
                ToolChoiceMode::Required => ToolChoiceOptions::Required,
            };
            args.tool_choice(ChatCompletionToolChoiceOption::Mode(opt));
        }
        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        let request = args.build().map_err(|e| {
            AgentError::ExecutionFailed(format!("OpenAI request build failed: {}", e))
        })?;

        debug!(
            trace_id = %trace_id,
            api_base = %self.api_base,
            model = %self.model,
            message_count = messages.len(),
            tools_count = tools.len(),
            temperature = ?self.temperature,
            "OpenAI chat create"
        );
        if let Ok(js) = serde_json::to_string_pretty(&request) {
            trace!(trace_id = %trace_id, request = %js, "OpenAI request body");
        }

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("OpenAI API error: {}", e)))?;

        if let Ok(js) = serde_json::to_string_pretty(&response) {
            trace!(trace_id = %trace_id, response = %js, "OpenAI response body");
        }

        let usage = response.usage.as_ref().map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        let choice =
            response.choices.into_iter().next().ok_or_else(|| {
                AgentError::ExecutionFailed("OpenAI returned no choices".to_string())
            })?;

        let msg = choice.message;
        let tool_calls: Vec<ToolCall> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| match tc {
                ChatCompletionMessageToolCalls::Function(f) => Some(ToolCall {
                    name: f.function.name,
                    arguments: f.function.arguments,
                    id: Some(f.id),
                }),
                _ => None,
            })
            .collect();

        debug!(
            trace_id = %trace_id,
            content_len = msg.content.as_ref().map_or(0, |c| c.len()),
            tool_calls = tool_calls.len(),
            "OpenAI chat response"
        );
        Ok(LlmResponse {
            content: msg.content.unwrap_or_default(),
            tool_calls,
            usage,
        })
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.complete(messages, &[]).await
    }

    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        self.complete(messages, tools).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: builder chain records model and keeps the configured base URL.
    #[test]
    fn chat_openai_with_config_keeps_model_and_base() {
        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base("http://localhost:9/v1");
        let client = ChatOpenAI::with_config(config, "gpt-4o-mini")
            .with_temperature(0.2)
            .with_tool_choice(ToolChoiceMode::Required);
        assert_eq!(client.model(), "gpt-4o-mini");
        assert_eq!(client.api_base, "http://localhost:9/v1");
        assert_eq!(client.tool_choice, ToolChoiceMode::Required);
    }

    /// **Scenario**: invoke() against an unreachable API base returns an error.
    #[tokio::test]
    async fn invoke_with_unreachable_base_returns_error() {
        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base("http://127.0.0.1:1");
        let client = ChatOpenAI::with_config(config, "gpt-4o-mini");
        let result = client.invoke(&[Message::user("Hello")]).await;
        assert!(matches!(result, Err(AgentError::ExecutionFailed(_))));
    }

    #[test]
    fn tools_to_request_maps_every_spec() {
        let tools = vec![ToolSpec {
            name: "search".into(),
            description: Some("Web search".into()),
            input_schema: serde_json::json!({"type": "object"}),
        }];
        let mapped = ChatOpenAI::tools_to_request(&tools);
        assert_eq!(mapped.len(), 1);
        match &mapped[0] {
            ChatCompletionTools::Function(t) => assert_eq!(t.function.name, "search"),
            _ => panic!("expected function tool"),
        }
    }
}

//! Mock LLM for tests.
//!
//! Three modes: a fixed response for every call, a scripted queue consumed in order, or a
//! responder closure that sees the messages and whether tools were offered. Every call is
//! recorded so tests can assert on prompts and tool offers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;
use crate::state::ToolCall;
use crate::tool_source::ToolSpec;

type Responder = Arc<dyn Fn(&[Message], bool) -> LlmResponse + Send + Sync>;

enum Script {
    Fixed(LlmResponse),
    Queue(Mutex<VecDeque<LlmResponse>>),
    Responder(Responder),
}

/// One recorded call.
#[derive(Clone, Debug)]
pub struct MockCall {
    pub messages: Vec<Message>,
    /// Names of the tools offered on this call (empty for `invoke`).
    pub tools: Vec<String>,
}

impl MockCall {
    pub fn system_prompt(&self) -> &str {
        self.messages
            .iter()
            .find(|m| matches!(m, Message::System(_)))
            .map(Message::content)
            .unwrap_or("")
    }

    pub fn human_prompt(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| matches!(m, Message::User(_)))
            .map(Message::content)
            .unwrap_or("")
    }
}

/// **Interaction**: implements `LlmClient`; used in place of `ChatOpenAI` in tests.
pub struct MockLlm {
    script: Script,
    calls: Mutex<Vec<MockCall>>,
}

impl MockLlm {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns `content` and no tool calls on every call.
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::with_script(Script::Fixed(LlmResponse::text(content)))
    }

    /// Returns the same content and tool calls on every call.
    pub fn new(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::with_script(Script::Fixed(LlmResponse {
            content: content.into(),
            tool_calls,
            usage: None,
        }))
    }

    /// Returns `responses` in order; further calls fail with `ExecutionFailed`.
    pub fn scripted(responses: impl IntoIterator<Item = LlmResponse>) -> Self {
        Self::with_script(Script::Queue(Mutex::new(responses.into_iter().collect())))
    }

    /// Computes each response from the messages and whether tools were offered.
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&[Message], bool) -> LlmResponse + Send + Sync + 'static,
    {
        Self::with_script(Script::Responder(Arc::new(responder)))
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn respond(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<LlmResponse, AgentError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MockCall {
                messages: messages.to_vec(),
                tools: tools.iter().map(|t| t.name.clone()).collect(),
            });
        match &self.script {
            Script::Fixed(response) => Ok(response.clone()),
            Script::Queue(queue) => queue
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .ok_or_else(|| AgentError::ExecutionFailed("mock LLM script exhausted".into())),
            Script::Responder(f) => Ok(f(messages, !tools.is_empty())),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.respond(messages, &[])
    }

    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<LlmResponse, AgentError> {
        self.respond(messages, tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_spec() -> ToolSpec {
        ToolSpec {
            name: "search".into(),
            description: None,
            input_schema: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn fixed_mock_repeats_its_response() {
        let llm = MockLlm::with_no_tool_calls("done");
        for _ in 0..2 {
            let out = llm.invoke(&[Message::user("hi")]).await.unwrap();
            assert_eq!(out.content, "done");
            assert!(out.tool_calls.is_empty());
        }
        assert_eq!(llm.call_count(), 2);
    }

    /// **Scenario**: a scripted mock fails once its queue is used up.
    #[tokio::test]
    async fn scripted_mock_fails_when_exhausted() {
        let llm = MockLlm::scripted([LlmResponse::text("one")]);
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "one");
        assert!(matches!(
            llm.invoke(&[]).await,
            Err(AgentError::ExecutionFailed(_))
        ));
    }

    #[tokio::test]
    async fn records_prompts_and_offered_tools() {
        let llm = MockLlm::from_fn(|_, tools_offered| {
            LlmResponse::text(if tools_offered { "with" } else { "without" })
        });
        let msgs = [Message::system("sys"), Message::user("human")];
        let with = llm.invoke_with_tools(&msgs, &[search_spec()]).await.unwrap();
        let without = llm.invoke_with_tools(&msgs, &[]).await.unwrap();
        assert_eq!(with.content, "with");
        assert_eq!(without.content, "without");

        let calls = llm.calls();
        assert_eq!(calls[0].tools, vec!["search".to_string()]);
        assert!(calls[1].tools.is_empty());
        assert_eq!(calls[0].system_prompt(), "sys");
        assert_eq!(calls[0].human_prompt(), "human");
    }
}

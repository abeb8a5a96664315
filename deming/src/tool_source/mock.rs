//! In-memory tool source for tests: fixed specs and canned results, optional failure.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Serves one tool (default `search`) that answers every call with the same text, or fails
/// with a transport error when built with `failing`. Calls are recorded.
pub struct MockToolSource {
    specs: Vec<ToolSpec>,
    result: Result<String, String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolSource {
    /// A `search` tool returning `text` for every call.
    pub fn search_returning(text: impl Into<String>) -> Self {
        Self {
            specs: vec![crate::tools::search_tool_spec()],
            result: Ok(text.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A `search` tool whose calls fail with `ToolSourceError::Transport(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            specs: vec![crate::tools::search_tool_spec()],
            result: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// No tools at all.
    pub fn empty() -> Self {
        Self {
            specs: vec![],
            result: Ok(String::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Recorded `(tool name, arguments)` pairs, oldest first.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.specs.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((name.to_string(), arguments));
        if !self.specs.iter().any(|s| s.name == name) {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        match &self.result {
            Ok(text) => Ok(ToolCallContent { text: text.clone() }),
            Err(msg) => Err(ToolSourceError::Transport(msg.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn search_returning_answers_and_records() {
        let source = MockToolSource::search_returning("[]");
        let out = source
            .call_tool("search", json!({"query": "rust"}))
            .await
            .unwrap();
        assert_eq!(out.text, "[]");
        assert_eq!(source.calls()[0].0, "search");
        assert!(matches!(
            source.call_tool("fetch", json!({})).await,
            Err(ToolSourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn failing_source_returns_transport_error() {
        let source = MockToolSource::failing("timeout");
        assert!(matches!(
            source.call_tool("search", json!({"query": "x"})).await,
            Err(ToolSourceError::Transport(m)) if m == "timeout"
        ));
        assert!(MockToolSource::empty().list_tools().await.unwrap().is_empty());
    }
}

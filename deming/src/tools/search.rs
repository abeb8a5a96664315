//! Search provider trait and the `search` tool built on top of it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Name of the only tool the agent is offered.
pub const TOOL_SEARCH: &str = "search";

/// Tool output when the provider found nothing.
pub const NO_RESULTS: &str = "No results.";

/// One hit from a search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Snippet or extracted page text.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A web search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short provider name for logs (`tavily`, `exa`).
    fn name(&self) -> &str;

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, ToolSourceError>;
}

/// Spec of the `search` tool: one required string argument `query`.
pub fn search_tool_spec() -> ToolSpec {
    ToolSpec {
        name: TOOL_SEARCH.to_string(),
        description: Some(
            "Search the web for current information. Use it when the step needs facts you \
             do not already have."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search query." }
            },
            "required": ["query"]
        }),
    }
}

/// Results as a pretty JSON array, or [`NO_RESULTS`] when empty.
pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }
    serde_json::to_string_pretty(results).unwrap_or_else(|_| NO_RESULTS.to_string())
}

/// Exposes a `SearchProvider` as a `ToolSource` with the single tool `search`.
///
/// **Interaction**: built by `agent::pdca::build_pdca_runner`; used by the Do and Tools phases.
pub struct SearchToolSource {
    provider: Arc<dyn SearchProvider>,
    max_results: usize,
}

impl SearchToolSource {
    pub fn new(provider: Arc<dyn SearchProvider>, max_results: usize) -> Self {
        Self {
            provider,
            max_results,
        }
    }
}

#[async_trait]
impl ToolSource for SearchToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(vec![search_tool_spec()])
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        if name != TOOL_SEARCH {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        let query = arguments
            .get("query")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ToolSourceError::InvalidInput("missing query".to_string()))?;
        tracing::debug!(
            provider = self.provider.name(),
            query,
            max_results = self.max_results,
            "search"
        );
        let results = self.provider.search(query, self.max_results).await?;
        Ok(ToolCallContent {
            text: format_results(&results),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FixedProvider {
        results: Vec<SearchResult>,
        seen: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl SearchProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn search(
            &self,
            query: &str,
            max_results: usize,
        ) -> Result<Vec<SearchResult>, ToolSourceError> {
            self.seen
                .lock()
                .unwrap()
                .push((query.to_string(), max_results));
            Ok(self.results.iter().take(max_results).cloned().collect())
        }
    }

    fn hit(n: u8) -> SearchResult {
        SearchResult {
            title: format!("Result {}", n),
            url: format!("https://example.com/{}", n),
            content: "snippet".into(),
            score: None,
        }
    }

    #[tokio::test]
    async fn search_tool_passes_query_and_limit() {
        let provider = Arc::new(FixedProvider {
            results: vec![hit(1), hit(2), hit(3)],
            seen: Mutex::new(vec![]),
        });
        let source = SearchToolSource::new(provider.clone(), 2);
        let out = source
            .call_tool(TOOL_SEARCH, json!({"query": "  rust async  "}))
            .await
            .unwrap();
        let parsed: Vec<SearchResult> = serde_json::from_str(&out.text).unwrap();
        assert_eq!(parsed, vec![hit(1), hit(2)]);
        assert_eq!(
            provider.seen.lock().unwrap().clone(),
            vec![("rust async".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn empty_results_read_no_results() {
        let provider = Arc::new(FixedProvider {
            results: vec![],
            seen: Mutex::new(vec![]),
        });
        let source = SearchToolSource::new(provider, 10);
        let out = source
            .call_tool(TOOL_SEARCH, json!({"query": "nothing"}))
            .await
            .unwrap();
        assert_eq!(out.text, NO_RESULTS);
    }

    #[tokio::test]
    async fn rejects_unknown_tool_and_missing_query() {
        let provider = Arc::new(FixedProvider {
            results: vec![],
            seen: Mutex::new(vec![]),
        });
        let source = SearchToolSource::new(provider, 10);
        assert!(matches!(
            source.call_tool("fetch", json!({})).await,
            Err(ToolSourceError::NotFound(_))
        ));
        assert!(matches!(
            source.call_tool(TOOL_SEARCH, json!({"query": " "})).await,
            Err(ToolSourceError::InvalidInput(_))
        ));
        let tools = source.list_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, TOOL_SEARCH);
    }

    #[test]
    fn score_is_omitted_when_absent() {
        let js = format_results(&[hit(1)]);
        assert!(!js.contains("score"), "{}", js);
    }
}

//! Tavily search API (`POST /search`, bearer auth).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::tool_source::ToolSourceError;

use super::{SearchProvider, SearchResult};

const TAVILY_BASE_URL: &str = "https://api.tavily.com";
/// Upper bound Tavily accepts for `max_results`.
const MAX_RESULTS_MAX: usize = 20;

fn tavily_base_url() -> String {
    std::env::var("TAVILY_BASE_URL").unwrap_or_else(|_| TAVILY_BASE_URL.to_string())
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyHit>,
}

#[derive(Debug, Deserialize)]
struct TavilyHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    score: Option<f64>,
}

/// Tavily client. The base URL defaults to `TAVILY_BASE_URL` or the public endpoint.
pub struct TavilySearch {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: tavily_base_url(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, ToolSourceError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let body = json!({
            "query": query,
            "max_results": max_results.clamp(1, MAX_RESULTS_MAX),
            "search_depth": "basic",
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let err_body = res.text().await.unwrap_or_default();
            return Err(ToolSourceError::Transport(format!(
                "Tavily API error {}: {}",
                status, err_body
            )));
        }
        let out: TavilyResponse = res
            .json()
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        Ok(out
            .results
            .into_iter()
            .map(|h| SearchResult {
                title: h.title,
                url: h.url,
                content: h.content,
                score: h.score,
            })
            .collect())
    }
}

//! Exa search API (`POST /search`, `x-api-key` header).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool_source::ToolSourceError;

use super::{SearchProvider, SearchResult};

const EXA_BASE_URL: &str = "https://api.exa.ai";
const NUM_RESULTS_MAX: usize = 100;
/// Characters of page text kept per result when no highlights or summary are returned.
const TEXT_MAX_PER_RESULT: usize = 1500;

fn exa_base_url() -> String {
    std::env::var("EXA_BASE_URL").unwrap_or_else(|_| EXA_BASE_URL.to_string())
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Content for one hit: highlights when present, else summary, else truncated text.
fn hit_content(r: &Value) -> String {
    let highlights: Vec<&str> = r
        .get("highlights")
        .and_then(|h| h.as_array())
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if !highlights.is_empty() {
        return highlights.join(" ... ");
    }
    if let Some(summary) = r
        .get("summary")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return summary.to_string();
    }
    let text = r.get("text").and_then(|t| t.as_str()).unwrap_or("").trim();
    truncate_chars(text, TEXT_MAX_PER_RESULT)
}

fn parse_results(value: &Value) -> Vec<SearchResult> {
    value
        .get("results")
        .and_then(|r| r.as_array())
        .map(|results| {
            results
                .iter()
                .map(|r| SearchResult {
                    title: r
                        .get("title")
                        .and_then(|t| t.as_str())
                        .unwrap_or("(no title)")
                        .to_string(),
                    url: r
                        .get("url")
                        .and_then(|u| u.as_str())
                        .unwrap_or("")
                        .to_string(),
                    content: hit_content(r),
                    score: r.get("score").and_then(|s| s.as_f64()),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Exa client. The base URL defaults to `EXA_BASE_URL` or the public endpoint.
pub struct ExaSearch {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl ExaSearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: exa_base_url(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SearchProvider for ExaSearch {
    fn name(&self) -> &str {
        "exa"
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, ToolSourceError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let body = json!({
            "query": query,
            "numResults": max_results.clamp(1, NUM_RESULTS_MAX),
            "type": "auto",
            "contents": {
                "text": { "maxCharacters": 6000 },
                "highlights": { "maxCharacters": 2000 }
            }
        });
        let res = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let err_body = res.text().await.unwrap_or_default();
            return Err(ToolSourceError::Transport(format!(
                "Exa API error {}: {}",
                status, err_body
            )));
        }
        let out: Value = res
            .json()
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        Ok(parse_results(&out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_results_prefers_highlights_then_summary_then_text() {
        let long_text = "x".repeat(TEXT_MAX_PER_RESULT + 10);
        let value = json!({
            "results": [
                {"title": "A", "url": "https://a", "highlights": ["h1", " ", "h2"], "summary": "s"},
                {"title": "B", "url": "https://b", "summary": " sum ", "score": 0.5},
                {"url": "https://c", "text": long_text}
            ]
        });
        let results = parse_results(&value);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].content, "h1 ... h2");
        assert_eq!(results[1].content, "sum");
        assert_eq!(results[1].score, Some(0.5));
        assert_eq!(results[2].title, "(no title)");
        assert!(results[2].content.ends_with("..."));
        assert_eq!(results[2].content.len(), TEXT_MAX_PER_RESULT + 3);
    }

    #[test]
    fn missing_results_is_empty() {
        assert!(parse_results(&json!({})).is_empty());
    }

    #[test]
    fn truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé...");
        assert_eq!(truncate_chars("hi", 5), "hi");
    }
}

//! Search providers against a local HTTP mock.


use std::sync::Arc;

use deming::{
    ExaSearch, SearchProvider, SearchToolSource, TavilySearch, ToolSource, ToolSourceError,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// **Scenario**: Tavily is called with bearer auth and its hits are mapped to results.
#[tokio::test]
async fn tavily_maps_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("authorization", "Bearer tvly-test"))
        .and(body_partial_json(json!({"query": "weather Montevideo", "max_results": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "weather Montevideo",
            "results": [
                {"title": "Forecast", "url": "https://example.com/f", "content": "14 C, light rain", "score": 0.91},
                {"title": "Climate", "url": "https://example.com/c", "content": "Mild winters"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tavily = TavilySearch::new("tvly-test").with_base_url(server.uri());
    let results = tavily.search("weather Montevideo", 3).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Forecast");
    assert_eq!(results[0].content, "14 C, light rain");
    assert_eq!(results[0].score, Some(0.91));
    assert_eq!(results[1].url, "https://example.com/c");
    assert_eq!(results[1].score, None);
}

/// **Scenario**: a non-success status becomes a transport error carrying the status.
#[tokio::test]
async fn tavily_http_error_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let tavily = TavilySearch::new("tvly-test").with_base_url(server.uri());
    match tavily.search("anything", 5).await {
        Err(ToolSourceError::Transport(msg)) => {
            assert!(msg.contains("500"), "{}", msg);
            assert!(msg.contains("upstream down"), "{}", msg);
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

/// **Scenario**: Exa is called with the x-api-key header and highlights become the content.
#[tokio::test]
async fn exa_uses_api_key_header_and_highlights() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("x-api-key", "exa-test"))
        .and(body_partial_json(json!({"query": "rust async", "numResults": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"title": "Tokio", "url": "https://tokio.rs", "highlights": ["async runtime", "for Rust"]},
                {"title": "Book", "url": "https://rust-lang.org", "text": "The async book"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let exa = ExaSearch::new("exa-test").with_base_url(format!("{}/", server.uri()));
    let results = exa.search("rust async", 2).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].content, "async runtime ... for Rust");
    assert_eq!(results[1].content, "The async book");
}

/// **Scenario**: the search tool formats provider hits as JSON and reports empty results.
#[tokio::test]
async fn search_tool_formats_provider_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({"query": "montevideo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "Montevideo", "url": "https://example.com/m", "content": "Capital of Uruguay"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({"query": "nothing here"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let provider = Arc::new(TavilySearch::new("tvly-test").with_base_url(server.uri()));
    let tools = SearchToolSource::new(provider, 5);

    let hit = tools
        .call_tool("search", json!({"query": "montevideo"}))
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&hit.text).unwrap();
    assert_eq!(parsed[0]["title"], "Montevideo");
    assert_eq!(parsed[0]["content"], "Capital of Uruguay");

    let empty = tools
        .call_tool("search", json!({"query": "nothing here"}))
        .await
        .unwrap();
    assert_eq!(empty.text, deming::tools::NO_RESULTS);
}

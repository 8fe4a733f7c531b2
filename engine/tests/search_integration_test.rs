//! Integration tests for the search providers and aggregator
//!
//! Every provider is pointed at a wiremock server speaking its API's JSON.

use serde_json::json;
use std::sync::Arc;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use parley_engine::config::{ProviderConfig, WikipediaConfig};
use parley_engine::search::{
    DuckDuckGoProvider, SearchAggregator, SearxngProvider, WikipediaProvider,
};
use sdk::{EngineError, SearchProvider};

fn provider_config(base_url: &str) -> ProviderConfig {
    ProviderConfig {
        enabled: true,
        base_url: base_url.to_string(),
        timeout_secs: 5,
    }
}

fn wikipedia_config(base_url: &str) -> WikipediaConfig {
    WikipediaConfig {
        enabled: true,
        base_url: base_url.to_string(),
        timeout_secs: 5,
        limit: 5,
    }
}

#[tokio::test]
async fn test_duckduckgo_abstract_and_related_topics() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "rust language"))
        .and(query_param("format", "json"))
        .and(query_param("no_html", "1"))
        .and(query_param("skip_disambig", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Abstract": "Rust is a general-purpose programming language.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            "Heading": "Rust (programming language)",
            "Image": "/i/rust.png",
            "RelatedTopics": [
                {
                    "Text": "Cargo - The Rust package manager",
                    "FirstURL": "https://duckduckgo.com/Cargo",
                    "Icon": { "URL": "/i/cargo.png" }
                },
                {
                    "Name": "See also",
                    "Topics": []
                },
                {
                    "Text": "Ferris - Unofficial mascot",
                    "FirstURL": "https://duckduckgo.com/Ferris",
                    "Icon": { "URL": "" }
                }
            ]
        })))
        .mount(&server)
        .await;

    let provider = DuckDuckGoProvider::new(&provider_config(&server.uri())).unwrap();
    let results = provider.search("rust language").await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].title, "Rust (programming language)");
    assert_eq!(
        results[0].favicon_url.as_deref(),
        Some("https://duckduckgo.com/i/rust.png")
    );
    assert_eq!(results[1].title, "Cargo");
    assert_eq!(results[1].snippet, "Cargo - The Rust package manager");
    assert_eq!(
        results[1].favicon_url.as_deref(),
        Some("https://duckduckgo.com/i/cargo.png")
    );
    assert_eq!(results[2].title, "Ferris");
    assert!(results[2].favicon_url.is_none());
}

#[tokio::test]
async fn test_duckduckgo_caps_related_topics_at_five() {
    let server = MockServer::start().await;

    let topics: Vec<_> = (0..8)
        .map(|i| {
            json!({
                "Text": format!("Topic {} - detail", i),
                "FirstURL": format!("https://duckduckgo.com/t{}", i),
            })
        })
        .collect();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Abstract": "",
            "AbstractURL": "",
            "RelatedTopics": topics,
        })))
        .mount(&server)
        .await;

    let provider = DuckDuckGoProvider::new(&provider_config(&server.uri())).unwrap();
    let results = provider.search("topics").await.unwrap();

    assert_eq!(results.len(), 5);
    assert_eq!(results[4].url, "https://duckduckgo.com/t4");
}

#[tokio::test]
async fn test_wikipedia_opensearch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "opensearch"))
        .and(query_param("search", "tokio"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            "tokio",
            ["Tokio", "Tokio (software)"],
            ["Capital of Japan", ""],
            [
                "https://en.wikipedia.org/wiki/Tokio",
                "https://en.wikipedia.org/wiki/Tokio_(software)"
            ]
        ])))
        .mount(&server)
        .await;

    let provider = WikipediaProvider::new(&wikipedia_config(&server.uri())).unwrap();
    let results = provider.search("tokio").await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].snippet, "Capital of Japan");
    assert_eq!(results[1].snippet, "Wikipedia article: Tokio (software)");
}

#[tokio::test]
async fn test_searxng_results_with_timestamp() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "title": "Async Rust",
                    "url": "https://rust-lang.github.io/async-book/",
                    "content": "Asynchronous programming in Rust",
                    "publishedDate": "2024-01-02T00:00:00"
                },
                { "title": "No url", "url": "", "content": "dropped" }
            ]
        })))
        .mount(&server)
        .await;

    let provider = SearxngProvider::new(&provider_config(&server.uri())).unwrap();
    let results = provider.search("async rust").await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].timestamp.as_deref(), Some("2024-01-02T00:00:00"));
}

#[tokio::test]
async fn test_http_error_maps_to_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let provider = SearxngProvider::new(&provider_config(&server.uri())).unwrap();
    let err = provider.search("anything").await.unwrap_err();

    match err {
        EngineError::Provider { provider, message } => {
            assert_eq!(provider, "SearXNG");
            assert!(message.contains("500"));
        }
        other => panic!("Expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_maps_to_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let provider = WikipediaProvider::new(&wikipedia_config(&server.uri())).unwrap();
    let err = provider.search("anything").await.unwrap_err();
    assert!(matches!(err, EngineError::Provider { .. }));
}

#[tokio::test]
async fn test_aggregator_dedupes_across_live_providers() {
    let ddg_server = MockServer::start().await;
    let wiki_server = MockServer::start().await;
    let broken_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Abstract": "Rust is a language.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust",
            "Heading": "Rust",
            "RelatedTopics": []
        })))
        .mount(&ddg_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            "rust",
            ["Rust", "Rustacean"],
            ["Wiki copy", "A Rust programmer"],
            [
                "https://en.wikipedia.org/wiki/Rust",
                "https://en.wikipedia.org/wiki/Rustacean"
            ]
        ])))
        .mount(&wiki_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&broken_server)
        .await;

    let providers: Vec<Arc<dyn SearchProvider>> = vec![
        Arc::new(DuckDuckGoProvider::new(&provider_config(&ddg_server.uri())).unwrap()),
        Arc::new(WikipediaProvider::new(&wikipedia_config(&wiki_server.uri())).unwrap()),
        Arc::new(SearxngProvider::new(&provider_config(&broken_server.uri())).unwrap()),
    ];
    let aggregator = SearchAggregator::new(providers, 10);

    let response = aggregator.search("rust").await;

    assert_eq!(response.query, "rust");
    assert_eq!(response.total_result_count, 2);
    assert_eq!(response.results.len(), 2);
    // First occurrence wins, so the DuckDuckGo snippet survives
    assert_eq!(response.results[0].snippet, "Rust is a language.");
    assert_eq!(
        response.contributing_sources,
        vec!["DuckDuckGo".to_string(), "Wikipedia".to_string()]
    );
}

//! Shared data types exchanged with external collaborators

use serde::{Deserialize, Serialize};

/// A single hit returned by a search provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl SearchResult {
    /// Create a result with no favicon or timestamp
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            favicon_url: None,
            timestamp: None,
        }
    }

    /// Attach a favicon URL
    pub fn with_favicon(mut self, favicon_url: impl Into<String>) -> Self {
        self.favicon_url = Some(favicon_url.into());
        self
    }

    /// Attach a publication timestamp
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// Aggregated outcome of one search across every configured provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    /// The query as submitted
    pub query: String,

    /// Deduplicated results, truncated to the aggregator's limit
    pub results: Vec<SearchResult>,

    /// Deduplicated result count before truncation
    pub total_result_count: usize,

    /// Wall-clock time of the whole aggregate call
    pub elapsed_ms: u64,

    /// Names of providers that contributed at least one result
    pub contributing_sources: Vec<String>,
}

impl SearchResponse {
    /// A well-formed response with nothing in it
    pub fn empty(query: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            query: query.into(),
            results: Vec::new(),
            total_result_count: 0,
            elapsed_ms,
            contributing_sources: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// A named routing target with a distinct response style
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelConfig {
    /// Stable identifier (e.g. "web", "code")
    pub id: String,

    /// Human-readable name
    pub display_name: String,

    /// Which backend serves this configuration
    pub provider_id: String,

    /// Model name understood by the provider
    pub internal_model: String,

    /// What this configuration is good at, most important first
    pub strength_tags: Vec<String>,

    pub description: String,
}

/// Extra context handed to a model backend alongside the prompt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationContext {
    /// System prompt establishing the assistant's identity
    pub system_prompt: String,

    /// Recent exchanges, oldest first
    #[serde(default)]
    pub history: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_builder() {
        let result = SearchResult::new("Rust", "https://www.rust-lang.org", "A language")
            .with_favicon("https://www.rust-lang.org/favicon.ico")
            .with_timestamp("2024-01-01T00:00:00Z");

        assert_eq!(result.title, "Rust");
        assert_eq!(
            result.favicon_url.as_deref(),
            Some("https://www.rust-lang.org/favicon.ico")
        );
        assert!(result.timestamp.is_some());
    }

    #[test]
    fn test_optional_fields_skipped_in_json() {
        let result = SearchResult::new("t", "https://a.example", "s");
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("favicon_url"));
        assert!(!json.contains("timestamp"));
    }

    #[test]
    fn test_empty_response() {
        let response = SearchResponse::empty("nothing", 12);
        assert!(response.is_empty());
        assert_eq!(response.total_result_count, 0);
        assert!(response.contributing_sources.is_empty());
        assert_eq!(response.elapsed_ms, 12);
    }
}

//! Wikipedia opensearch provider
//!
//! `action=opensearch` answers with four parallel arrays:
//! `[query, titles, descriptions, urls]`.

use async_trait::async_trait;
use sdk::{EngineError, SearchProvider, SearchResult};
use std::time::Duration;

use super::{endpoint, fetch_json, http_client};
use crate::config::WikipediaConfig;

const NAME: &str = "Wikipedia";

type OpenSearchResponse = (String, Vec<String>, Vec<String>, Vec<String>);

pub struct WikipediaProvider {
    base_url: String,
    timeout: Duration,
    limit: usize,
    client: reqwest::Client,
}

impl WikipediaProvider {
    pub fn new(config: &WikipediaConfig) -> Result<Self, EngineError> {
        let timeout = config.provider().timeout();
        Ok(Self {
            base_url: config.base_url.clone(),
            timeout,
            limit: config.limit,
            client: http_client(timeout)?,
        })
    }

    fn into_results(response: OpenSearchResponse) -> Vec<SearchResult> {
        let (_, titles, descriptions, urls) = response;

        titles
            .into_iter()
            .zip(urls)
            .enumerate()
            .filter(|(_, (_, url))| !url.is_empty())
            .map(|(i, (title, url))| {
                let snippet = descriptions
                    .get(i)
                    .filter(|d| !d.is_empty())
                    .cloned()
                    .unwrap_or_else(|| format!("Wikipedia article: {}", title));
                SearchResult::new(title, url, snippet)
            })
            .collect()
    }
}

#[async_trait]
impl SearchProvider for WikipediaProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, EngineError> {
        let url = endpoint(&self.base_url, "w/api.php");
        let limit = self.limit.to_string();

        let response: OpenSearchResponse = fetch_json(
            &self.client,
            NAME,
            &url,
            &[
                ("action", "opensearch"),
                ("search", query),
                ("limit", &limit),
                ("namespace", "0"),
                ("format", "json"),
            ],
        )
        .await?;

        Ok(Self::into_results(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_arrays() {
        let response: OpenSearchResponse = serde_json::from_str(
            r#"["rust",
                ["Rust", "Rust (programming language)"],
                ["Iron oxide", ""],
                ["https://en.wikipedia.org/wiki/Rust",
                 "https://en.wikipedia.org/wiki/Rust_(programming_language)"]]"#,
        )
        .unwrap();

        let results = WikipediaProvider::into_results(response);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].snippet, "Iron oxide");
        assert_eq!(
            results[1].snippet,
            "Wikipedia article: Rust (programming language)"
        );
    }

    #[test]
    fn test_no_matches() {
        let response: OpenSearchResponse =
            serde_json::from_str(r#"["zzzz", [], [], []]"#).unwrap();
        assert!(WikipediaProvider::into_results(response).is_empty());
    }
}

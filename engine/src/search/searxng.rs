//! SearXNG provider
//!
//! Queries a self-hosted metasearch instance through its JSON output format.
//! The instance must have `json` enabled in its `search.formats` setting.

use async_trait::async_trait;
use sdk::{EngineError, SearchProvider, SearchResult};
use serde::Deserialize;
use std::time::Duration;

use super::{endpoint, fetch_json, http_client};
use crate::config::ProviderConfig;

const NAME: &str = "SearXNG";

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    #[serde(default)]
    title: String,

    #[serde(default)]
    url: String,

    #[serde(default)]
    content: String,

    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
}

pub struct SearxngProvider {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl SearxngProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, EngineError> {
        Ok(Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            client: http_client(config.timeout())?,
        })
    }
}

#[async_trait]
impl SearchProvider for SearxngProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, EngineError> {
        let url = endpoint(&self.base_url, "search");
        let response: SearxngResponse =
            fetch_json(&self.client, NAME, &url, &[("q", query), ("format", "json")]).await?;

        Ok(response
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .map(|r| {
                let mut result = SearchResult::new(r.title, r.url, r.content);
                if let Some(date) = r.published_date.filter(|d| !d.is_empty()) {
                    result = result.with_timestamp(date);
                }
                result
            })
            .collect())
    }
}

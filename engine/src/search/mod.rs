//! Web Search
//!
//! Concrete search providers and the aggregator that fans a query out to all
//! of them. Every provider speaks a different JSON API but satisfies the same
//! sdk `SearchProvider` contract, so the aggregator never knows which
//! protocol sits behind a name.
//!
//! Provider priority is the order providers are handed to the aggregator.
//! `providers_from_config` uses DuckDuckGo, Wikipedia, SearXNG.

use std::sync::Arc;
use std::time::Duration;

use sdk::{EngineError, SearchProvider};
use serde::de::DeserializeOwned;

use crate::config::SearchConfig;

pub mod aggregator;
pub mod duckduckgo;
pub mod searxng;
pub mod wikipedia;

pub use aggregator::{merge_results, MergedResults, SearchAggregator};
pub use duckduckgo::DuckDuckGoProvider;
pub use searxng::SearxngProvider;
pub use wikipedia::WikipediaProvider;

const USER_AGENT: &str = concat!("parley/", env!("CARGO_PKG_VERSION"));

/// Build the enabled providers in priority order
pub fn providers_from_config(
    config: &SearchConfig,
) -> Result<Vec<Arc<dyn SearchProvider>>, EngineError> {
    let mut providers: Vec<Arc<dyn SearchProvider>> = Vec::new();

    if config.duckduckgo.enabled {
        providers.push(Arc::new(DuckDuckGoProvider::new(&config.duckduckgo)?));
    }
    if config.wikipedia.enabled {
        providers.push(Arc::new(WikipediaProvider::new(&config.wikipedia)?));
    }
    if config.searxng.enabled {
        providers.push(Arc::new(SearxngProvider::new(&config.searxng)?));
    }

    tracing::debug!(
        "Configured search providers: {:?}",
        providers.iter().map(|p| p.name()).collect::<Vec<_>>()
    );

    Ok(providers)
}

/// HTTP client shared by the providers' constructors
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, EngineError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| EngineError::Network(format!("Failed to build HTTP client: {}", e)))
}

/// GET `url` and decode the JSON body, mapping every failure to a
/// provider-scoped error
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    provider: &str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, EngineError> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| EngineError::provider(provider, format!("Request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(EngineError::provider(provider, format!("HTTP {}", status)));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| EngineError::provider(provider, format!("Invalid response body: {}", e)))
}

/// Join a base URL and a path without doubling slashes
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_default_providers_in_priority_order() {
        let config = Config::default();
        let providers = providers_from_config(&config.search).unwrap();
        let names: Vec<_> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["DuckDuckGo", "Wikipedia"]);
    }

    #[test]
    fn test_all_providers_enabled() {
        let mut config = Config::default();
        config.search.searxng.enabled = true;
        let providers = providers_from_config(&config.search).unwrap();
        assert_eq!(providers.len(), 3);
        assert_eq!(providers[2].name(), "SearXNG");
        assert_eq!(providers[2].timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_endpoint_join() {
        assert_eq!(endpoint("http://a/", "/search"), "http://a/search");
        assert_eq!(endpoint("http://a", "w/api.php"), "http://a/w/api.php");
        assert_eq!(endpoint("http://a", ""), "http://a/");
    }
}

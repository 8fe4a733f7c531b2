//! Search Aggregator
//!
//! Sends one query to every provider at once, each call bounded by that
//! provider's own timeout. A provider that errors or times out contributes
//! nothing; the aggregate call itself never fails.
//!
//! Results are concatenated in provider-priority order, deduplicated by
//! exact URL (first occurrence wins) and truncated to `max_results`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use sdk::{EngineError, SearchProvider, SearchResponse, SearchResult};

use super::providers_from_config;
use crate::config::SearchConfig;

/// Default cap on returned results
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Output of [`merge_results`]
#[derive(Debug, Clone, PartialEq)]
pub struct MergedResults {
    /// Deduplicated results, at most `max_results`
    pub results: Vec<SearchResult>,
    /// Deduplicated count before truncation
    pub total_result_count: usize,
    /// Providers that returned at least one result, in priority order
    pub contributing_sources: Vec<String>,
}

/// Merge per-provider batches given in priority order
pub fn merge_results(batches: Vec<(String, Vec<SearchResult>)>, max_results: usize) -> MergedResults {
    let mut seen = HashSet::new();
    let mut results = Vec::new();
    let mut contributing_sources = Vec::new();

    for (source, batch) in batches {
        if batch.is_empty() {
            continue;
        }
        contributing_sources.push(source);

        for result in batch {
            if seen.insert(result.url.clone()) {
                results.push(result);
            }
        }
    }

    let total_result_count = results.len();
    results.truncate(max_results);

    MergedResults {
        results,
        total_result_count,
        contributing_sources,
    }
}

/// Fans queries out to a fixed, ordered set of providers
pub struct SearchAggregator {
    providers: Vec<Arc<dyn SearchProvider>>,
    max_results: usize,
}

impl SearchAggregator {
    /// Providers are queried concurrently but merged in the order given here
    pub fn new(providers: Vec<Arc<dyn SearchProvider>>, max_results: usize) -> Self {
        Self {
            providers,
            max_results,
        }
    }

    /// Build an aggregator over the enabled providers of `config`
    pub fn from_config(config: &SearchConfig) -> Result<Self, EngineError> {
        Ok(Self::new(providers_from_config(config)?, config.max_results))
    }

    /// Provider names in priority order
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Run `query` against all providers
    pub async fn search(&self, query: &str) -> SearchResponse {
        let started = Instant::now();

        let calls = self.providers.iter().map(|provider| async move {
            let timeout = provider.timeout();
            let outcome = match tokio::time::timeout(timeout, provider.search(query)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(EngineError::ProviderTimeout {
                    provider: provider.name().to_string(),
                    timeout,
                }),
            };
            (provider.name().to_string(), outcome)
        });

        let mut batches = Vec::with_capacity(self.providers.len());
        for (name, outcome) in join_all(calls).await {
            match outcome {
                Ok(results) => {
                    tracing::debug!("{} returned {} results", name, results.len());
                    batches.push((name, results));
                }
                Err(e) => {
                    tracing::warn!("Search provider skipped: {}", e);
                }
            }
        }

        let merged = merge_results(batches, self.max_results);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            "Search for '{}' returned {} of {} results in {}ms",
            query,
            merged.results.len(),
            merged.total_result_count,
            elapsed_ms
        );

        SearchResponse {
            query: query.to_string(),
            results: merged.results,
            total_result_count: merged.total_result_count,
            elapsed_ms,
            contributing_sources: merged.contributing_sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    struct StaticProvider {
        name: &'static str,
        urls: Vec<&'static str>,
    }

    #[async_trait]
    impl SearchProvider for StaticProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        async fn search(&self, query: &str) -> Result<Vec<SearchResult>, EngineError> {
            Ok(self
                .urls
                .iter()
                .map(|u| SearchResult::new(format!("{} {}", self.name, query), *u, "snippet"))
                .collect())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl SearchProvider for FailingProvider {
        fn name(&self) -> &str {
            "Broken"
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, EngineError> {
            Err(EngineError::provider("Broken", "HTTP 503"))
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl SearchProvider for SlowProvider {
        fn name(&self) -> &str {
            "Slow"
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(50)
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, EngineError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![SearchResult::new("late", "https://late.example", "late")])
        }
    }

    struct DelayedProvider {
        name: &'static str,
        delay: Duration,
        finished: Arc<std::sync::Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl SearchProvider for DelayedProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, EngineError> {
            tokio::time::sleep(self.delay).await;
            if let Ok(mut finished) = self.finished.lock() {
                finished.push(self.name);
            }
            Ok(vec![SearchResult::new(
                self.name,
                format!("https://{}.example", self.name.to_lowercase()),
                "snippet",
            )])
        }
    }

    /// Returns only once every provider sharing the barrier has been called
    struct RendezvousProvider {
        name: &'static str,
        barrier: Arc<tokio::sync::Barrier>,
    }

    #[async_trait]
    impl SearchProvider for RendezvousProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(2)
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, EngineError> {
            self.barrier.wait().await;
            Ok(vec![SearchResult::new(
                self.name,
                format!("https://{}.example", self.name),
                "snippet",
            )])
        }
    }

    fn stat(name: &'static str, urls: &[&'static str]) -> Arc<dyn SearchProvider> {
        Arc::new(StaticProvider {
            name,
            urls: urls.to_vec(),
        })
    }

    #[tokio::test]
    async fn test_dedup_keeps_first_in_priority_order() {
        let aggregator = SearchAggregator::new(
            vec![
                stat("A", &["https://one", "https://two"]),
                stat("B", &["https://two", "https://three"]),
            ],
            10,
        );

        let response = aggregator.search("q").await;
        let urls: Vec<_> = response.results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://one", "https://two", "https://three"]);
        assert_eq!(response.results[1].title, "A q");
        assert_eq!(response.total_result_count, 3);
        assert_eq!(response.contributing_sources, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_truncates_but_counts_all() {
        let urls: Vec<&'static str> = vec![
            "https://1", "https://2", "https://3", "https://4", "https://5", "https://6",
        ];
        let aggregator = SearchAggregator::new(vec![stat("A", &urls), stat("B", &urls)], 4);

        let response = aggregator.search("q").await;
        assert_eq!(response.results.len(), 4);
        assert_eq!(response.total_result_count, 6);
    }

    #[tokio::test]
    async fn test_failures_and_timeouts_are_isolated() {
        let aggregator = SearchAggregator::new(
            vec![
                Arc::new(FailingProvider),
                Arc::new(SlowProvider),
                stat("Good", &["https://ok"]),
            ],
            10,
        );

        let response = aggregator.search("q").await;
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.contributing_sources, vec!["Good"]);
        assert!(response.elapsed_ms < 5_000);
    }

    #[tokio::test]
    async fn test_providers_run_concurrently() {
        let finished = Arc::new(std::sync::Mutex::new(Vec::new()));
        let delayed = |name, ms| -> Arc<dyn SearchProvider> {
            Arc::new(DelayedProvider {
                name,
                delay: Duration::from_millis(ms),
                finished: Arc::clone(&finished),
            })
        };
        let aggregator = SearchAggregator::new(
            vec![delayed("First", 250), delayed("Second", 200), delayed("Third", 50)],
            10,
        );

        let started = Instant::now();
        let response = aggregator.search("q").await;
        let wall = started.elapsed();

        // Sequential calls would take at least 500ms
        assert!(wall < Duration::from_millis(450), "took {:?}", wall);
        assert!(response.elapsed_ms < 450);

        // The lowest-priority provider finishes first but still merges last
        assert_eq!(*finished.lock().unwrap(), vec!["Third", "Second", "First"]);
        assert_eq!(response.contributing_sources, vec!["First", "Second", "Third"]);
        let titles: Vec<_> = response.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_every_provider_is_in_flight_together() {
        let barrier = Arc::new(tokio::sync::Barrier::new(3));
        let providers: Vec<Arc<dyn SearchProvider>> = ["a", "b", "c"]
            .into_iter()
            .map(|name| {
                Arc::new(RendezvousProvider {
                    name,
                    barrier: Arc::clone(&barrier),
                }) as Arc<dyn SearchProvider>
            })
            .collect();

        let response = SearchAggregator::new(providers, 10).search("q").await;
        assert_eq!(response.contributing_sources, vec!["a", "b", "c"]);
        assert_eq!(response.results.len(), 3);
    }

    #[tokio::test]
    async fn test_all_providers_fail() {
        let aggregator =
            SearchAggregator::new(vec![Arc::new(FailingProvider), Arc::new(SlowProvider)], 10);

        let response = aggregator.search("nothing").await;
        assert!(response.results.is_empty());
        assert_eq!(response.total_result_count, 0);
        assert!(response.contributing_sources.is_empty());
        assert_eq!(response.query, "nothing");
    }

    #[tokio::test]
    async fn test_no_providers() {
        let response = SearchAggregator::new(Vec::new(), 10).search("q").await;
        assert!(response.is_empty());
    }

    #[test]
    fn test_empty_batch_not_a_source() {
        let merged = merge_results(
            vec![
                ("A".to_string(), Vec::new()),
                ("B".to_string(), vec![SearchResult::new("t", "https://b", "s")]),
            ],
            10,
        );
        assert_eq!(merged.contributing_sources, vec!["B".to_string()]);
    }
}

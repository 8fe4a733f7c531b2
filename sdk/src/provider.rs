//! Collaborator contracts
//!
//! The engine never talks to a search engine or a language model directly.
//! It goes through these two traits, so any protocol (HTTP JSON API, local
//! index, test double) can sit behind them.

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::EngineError;
use crate::types::{GenerationContext, ModelConfig, SearchResult};

/// Timeout applied to providers that do not choose their own
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// A single external search backend
///
/// Each call is independently fallible. The aggregator enforces
/// [`SearchProvider::timeout`] around every call.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Name reported in `contributing_sources` (e.g. "DuckDuckGo")
    fn name(&self) -> &str;

    /// Upper bound for a single `search` call
    fn timeout(&self) -> Duration {
        DEFAULT_PROVIDER_TIMEOUT
    }

    /// Run the query and return results in the provider's own ranking
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, EngineError>;
}

/// Text generation backend reached with a routed model configuration
///
/// Implementations may fail; callers must translate a failure into fallback
/// text rather than surfacing it.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Produce a reply for `prompt` using `model`
    async fn generate(
        &self,
        prompt: &str,
        model: &ModelConfig,
        context: &GenerationContext,
    ) -> Result<String, EngineError>;
}

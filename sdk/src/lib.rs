//! Parley SDK
//!
//! Shared library providing the collaborator traits, data types and error
//! type used by the Parley engine and by anything that plugs a search
//! provider or model backend into it.

/// Error types and handling
pub mod errors;

/// Search provider and model backend traits
pub mod provider;

/// Search and model data types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, ParleyErrorExt};
pub use provider::{ModelBackend, SearchProvider};
pub use types::{GenerationContext, ModelConfig, SearchResponse, SearchResult};

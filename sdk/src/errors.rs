//! Error types and handling
//!
//! This module provides the error types used throughout the Parley engine.
//! All errors implement the `ParleyErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! None of these errors ever reach the person chatting with the engine: the
//! orchestrator converts them into a polite fallback reply. They surface in
//! logs, in the CLI, and in the `failed` state of tasks and steps.

use std::time::Duration;
use thiserror::Error;

/// Trait for Parley error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait ParleyErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and does not contain
    /// provider URLs or internal implementation details.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors typically require a configuration change.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration
/// - **Search**: Provider failures, timeouts and malformed payloads
/// - **Execution**: Strategy failures and illegal task transitions
/// - **Backend**: Model backend collaborator failures
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, ParleyErrorExt};
/// use std::time::Duration;
///
/// let error = EngineError::ProviderTimeout {
///     provider: "Wikipedia".to_string(),
///     timeout: Duration::from_secs(8),
/// };
/// assert!(error.is_recoverable());
///
/// let fatal = EngineError::Config("bad log level".to_string());
/// assert!(!fatal.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Search errors
    #[error("Search error: {0}")]
    Search(String),

    #[error("Search provider {provider} timed out after {timeout:?}")]
    ProviderTimeout { provider: String, timeout: Duration },

    #[error("Search provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    // Execution errors
    #[error("Strategy error: {0}")]
    Strategy(String),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Unknown session: {0}")]
    UnknownSession(String),

    // Model backend errors
    #[error("Model backend error: {0}")]
    Backend(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Convenience constructor for a provider-scoped failure
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

impl ParleyErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",

            Self::Search(_) => "Web search is unavailable right now. Try again shortly",
            Self::ProviderTimeout { .. } => "A search provider took too long to respond",
            Self::Provider { .. } => "A search provider returned an error",

            Self::Strategy(_) => "The request could not be completed. Please try again",
            Self::InvalidTransition { .. } => "Internal task state error",
            Self::UnknownSession(_) => "That conversation no longer exists",

            Self::Backend(_) => "The model backend is unavailable. Try again later",

            Self::Network(_) => "Network operation failed. Check your connection",

            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::Config(_) | Self::InvalidTransition { .. } => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}

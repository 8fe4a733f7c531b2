//! Parley Engine Library
//!
//! This library provides the core functionality of the Parley engine.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Assistant identity profile and identity questions
pub mod identity;

/// Model backend collaborator and model router
pub mod llm;

/// Web search providers and aggregation
pub mod search;

/// Incremental, cancellable reply streaming
pub mod stream;

/// Task orchestration, memory and sessions
pub mod agent;

/// Message bus for observing engine events
pub mod message_bus;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;

//! Config-driven profile summarization.
//!
//! This crate bundles the workspace crates behind feature flags so users can
//! depend on the configuration resolver alone or on the full agent.

#![warn(missing_docs, clippy::pedantic)]

/// Layered configuration resolver (always available).
pub use summarizer_config as config;

/// Text generation backends (enabled by `adapters` feature).
#[cfg(feature = "adapters")]
pub use summarizer_adapters as adapters;

/// Profile summarizer agent (enabled by `agent` feature).
#[cfg(feature = "agent")]
pub use summarizer_agent as agent;

/// Loads and resolves a configuration file with the default loader.
pub use summarizer_config::load;

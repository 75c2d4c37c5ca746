//! Layered configuration loading for the profile summarizer.
//!
//! A configuration file may be JSON, YAML (behind the `yaml` feature), INI or
//! `key = value` text. Any document may instead be a single pointer string
//! such as `"@@config.txt"`, which redirects loading to another file, and any
//! value may be a pointer whose target file's text replaces it.
//!
//! ```no_run
//! let config = summarizer_config::load("configs/config.json")?;
//! let prompt = config.require_str("prompt")?;
//! # Ok::<(), summarizer_config::ConfigError>(())
//! ```

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod format;
mod loader;
mod paths;
mod pointer;
mod resolved;
mod value;

/// Error type and result alias for configuration loading.
pub use error::{ConfigError, ConfigResult};
/// Format registry and raw parsed documents.
pub use format::{Format, Mapping, RawDocument};
/// Loader entry points.
pub use loader::{ConfigLoader, load};
/// Pointer sigil handling and indirection tracking.
pub use pointer::{IndirectionChain, MAX_CHAIN_LEN, SIGIL, pointer_target};
/// Resolved configuration handed to consumers.
pub use resolved::ResolvedConfig;
/// Scalar values and type inference.
pub use value::{ConfigValue, infer_scalar};

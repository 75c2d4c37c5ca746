//! Errors raised by the profile summarizer.

use std::path::PathBuf;

use summarizer_adapters::traits::AdapterError;
use summarizer_config::ConfigError;
use thiserror::Error;

/// Result alias for summarizer operations.
pub type SummarizerResult<T> = Result<T, SummarizerError>;

/// Errors emitted while building or running a [`ProfileSummarizer`](crate::ProfileSummarizer).
#[derive(Debug, Error)]
pub enum SummarizerError {
    /// Loading or reading the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The backend requires a secret that was not supplied.
    #[error("{variable} missing in environment")]
    MissingCredential {
        /// Environment variable expected to hold the secret.
        variable: &'static str,
    },

    /// The generative backend failed.
    #[error("model call failed: {source}")]
    Adapter {
        /// Source adapter error.
        #[from]
        source: AdapterError,
    },

    /// `process` was called with nothing queued.
    #[error("no profile inputs queued")]
    EmptyQueue,

    /// A profile input file had an unusable shape.
    #[error("invalid profile input in {}: {reason}", .path.display())]
    InvalidProfile {
        /// Offending file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A profile input file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SummarizerError {
    /// Convenience constructor for profile shape errors.
    #[must_use]
    pub fn invalid_profile(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidProfile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

//! Error types for configuration loading.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used by the configuration loader.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading and resolving a configuration document.
///
/// Loading is all-or-nothing: the first error aborts the whole load.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The referenced file does not exist.
    #[error("config file not found: {}", .path.display())]
    FileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The file extension does not map to a known format.
    #[error("unsupported config format `{extension}` for {}", .path.display())]
    UnsupportedFormat {
        /// Lowercased extension (empty when the file has none).
        extension: String,
        /// Offending file.
        path: PathBuf,
    },

    /// The format is known but its parser was compiled out.
    #[error("cannot parse {}: {format} support requires the `{feature}` feature", .path.display())]
    MissingOptionalDependency {
        /// Human-readable format name.
        format: &'static str,
        /// Cargo feature that enables the parser.
        feature: &'static str,
        /// Offending file.
        path: PathBuf,
    },

    /// A key/value text line has no `=` separator.
    #[error("bad line {line_number} in {}: {line:?}", .path.display())]
    MalformedLine {
        /// Offending file.
        path: PathBuf,
        /// 1-based line number.
        line_number: usize,
        /// Trimmed line contents.
        line: String,
    },

    /// Whole-document pointers revisited a file or exceeded the chain bound.
    #[error("config indirection loop detected: {}", DisplayChain(.chain))]
    IndirectionLoop {
        /// Every path visited, ending with the rejected one.
        chain: Vec<PathBuf>,
    },

    /// The document did not reduce to a flat mapping.
    #[error("config {} must resolve to a mapping: {reason}", .path.display())]
    InvalidResolution {
        /// Offending file.
        path: PathBuf,
        /// What was found instead.
        reason: String,
    },

    /// The underlying format library rejected the document.
    #[error("failed to parse {} as {format}: {reason}", .path.display())]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Format the file was parsed as.
        format: &'static str,
        /// Parser message.
        reason: String,
    },

    /// Reading a file failed for a reason other than absence.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A required key is absent from the resolved configuration.
    #[error("missing config key `{key}`")]
    MissingKey {
        /// Requested key.
        key: String,
    },

    /// A key holds a value of the wrong type.
    #[error("config key `{key}` must be {expected}, found {found}")]
    InvalidType {
        /// Requested key.
        key: String,
        /// Expected type name.
        expected: &'static str,
        /// Actual type name.
        found: &'static str,
    },
}

impl ConfigError {
    /// Convenience constructor for resolution failures.
    #[must_use]
    pub fn invalid_resolution(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidResolution {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Convenience constructor for format library failures.
    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, format: &'static str, reason: impl fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            format,
            reason: reason.to_string(),
        }
    }

    /// Maps an I/O failure on `path`, keeping absence distinct.
    pub(crate) fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

struct DisplayChain<'a>(&'a [PathBuf]);

impl fmt::Display for DisplayChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, path) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_message_lists_chain() {
        let err = ConfigError::IndirectionLoop {
            chain: vec![PathBuf::from("a.json"), PathBuf::from("b.json"), PathBuf::from("a.json")],
        };
        assert_eq!(
            err.to_string(),
            "config indirection loop detected: a.json -> b.json -> a.json"
        );
    }

    #[test]
    fn not_found_io_maps_to_file_not_found() {
        let source = std::io::Error::from(std::io::ErrorKind::NotFound);
        let err = ConfigError::from_io(Path::new("missing.txt"), source);
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}

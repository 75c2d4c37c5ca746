//! Entry point tying format parsing and pointer resolution together.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::format::{Format, RawDocument};
use crate::paths::absolutize;
use crate::pointer::{self, IndirectionChain, MAX_CHAIN_LEN};
use crate::resolved::ResolvedConfig;

/// Loads configuration files, following pointers between them.
///
/// The loader holds no state between calls: each [`load`](Self::load) gets
/// its own [`IndirectionChain`], so one loader may serve concurrent callers.
#[derive(Clone, Copy, Debug)]
pub struct ConfigLoader {
    max_chain_len: usize,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader with the default chain bound.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_chain_len: MAX_CHAIN_LEN,
        }
    }

    /// Overrides the maximum number of documents in a chain.
    #[must_use]
    pub const fn with_max_chain_len(mut self, max_chain_len: usize) -> Self {
        self.max_chain_len = max_chain_len;
        self
    }

    /// Loads and fully resolves the configuration at `path`.
    ///
    /// `~` is expanded and relative paths are taken from the working
    /// directory. The file's format is chosen by its extension. A document
    /// that is a pointer string is replaced by the file it names, then inline
    /// pointers in the final mapping are replaced by file contents.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered; nothing is returned
    /// partially.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<ResolvedConfig> {
        let mut chain = IndirectionChain::new(self.max_chain_len);
        let entry = absolutize(path.as_ref())?;
        let config = self.load_document(entry, &mut chain)?;
        info!(
            source = %config.source().display(),
            keys = config.len(),
            hops = chain.len() - 1,
            "configuration resolved"
        );
        Ok(config)
    }

    fn load_document(
        &self,
        path: PathBuf,
        chain: &mut IndirectionChain,
    ) -> ConfigResult<ResolvedConfig> {
        chain.check_capacity(&path)?;
        if !path.exists() {
            return Err(ConfigError::FileNotFound { path });
        }
        // Loops are detected on canonical paths; pointers stay relative to
        // the path as referenced, symlinks included.
        let canonical = fs::canonicalize(&path).map_err(|err| ConfigError::from_io(&path, err))?;
        chain.enter(canonical)?;

        let format = Format::from_path(&path)?;
        let text = fs::read_to_string(&path).map_err(|err| ConfigError::from_io(&path, err))?;
        debug!(path = %path.display(), format = format.name(), "parsing config document");

        match format.parse(&path, &text)? {
            RawDocument::Pointer(document) => {
                let target = pointer::redirect_target(&path, &document)?;
                debug!(from = %path.display(), to = %target.display(), "following config pointer");
                self.load_document(target, chain)
            }
            RawDocument::Mapping(mut mapping) => {
                pointer::expand_inline(&path, &mut mapping)?;
                Ok(ResolvedConfig::new(mapping, path))
            }
            RawDocument::Other(kind) => Err(ConfigError::invalid_resolution(
                path,
                format!("found {kind}"),
            )),
        }
    }
}

/// Loads `path` with the default [`ConfigLoader`].
///
/// # Errors
///
/// See [`ConfigLoader::load`].
pub fn load(path: impl AsRef<Path>) -> ConfigResult<ResolvedConfig> {
    ConfigLoader::new().load(path)
}

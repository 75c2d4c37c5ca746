//! File pointers: whole-document redirects and inline value substitution.
//!
//! A string starting with [`SIGIL`] names another file. At the top level of a
//! document it replaces the whole document with the named file. As a value
//! inside a mapping it is replaced by the named file's raw text. Both resolve
//! relative paths against the directory of the file that holds the pointer.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::format::Mapping;
use crate::paths::resolve_against;
use crate::value::ConfigValue;

/// Reserved prefix marking a string as a file pointer.
pub const SIGIL: &str = "@@";

/// Maximum number of documents in one indirection chain: the entry file plus
/// three redirects.
pub const MAX_CHAIN_LEN: usize = 4;

/// Returns the path named by `value` if it carries the pointer sigil.
#[must_use]
pub fn pointer_target(value: &str) -> Option<&str> {
    value.strip_prefix(SIGIL).map(str::trim)
}

/// Files visited while following whole-document pointers for one load.
///
/// Each top-level load owns its own chain; nothing is shared between loads.
#[derive(Clone, Debug)]
pub struct IndirectionChain {
    visited: Vec<PathBuf>,
    max_len: usize,
}

impl Default for IndirectionChain {
    fn default() -> Self {
        Self::new(MAX_CHAIN_LEN)
    }
}

impl IndirectionChain {
    /// Creates an empty chain admitting at most `max_len` documents.
    #[must_use]
    pub const fn new(max_len: usize) -> Self {
        Self {
            visited: Vec::new(),
            max_len,
        }
    }

    /// Checks that one more document may be entered.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IndirectionLoop`] when the chain is full.
    pub fn check_capacity(&self, next: &Path) -> ConfigResult<()> {
        if self.visited.len() >= self.max_len {
            return Err(self.loop_error(next));
        }
        Ok(())
    }

    /// Records `path` (canonical form) as visited.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IndirectionLoop`] if the path was already
    /// visited or the chain is full.
    pub fn enter(&mut self, path: PathBuf) -> ConfigResult<()> {
        self.check_capacity(&path)?;
        if self.visited.contains(&path) {
            return Err(self.loop_error(&path));
        }
        self.visited.push(path);
        Ok(())
    }

    /// Number of documents visited so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    /// Whether no document has been visited yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    /// Visited paths in order.
    #[must_use]
    pub fn visited(&self) -> &[PathBuf] {
        &self.visited
    }

    fn loop_error(&self, next: &Path) -> ConfigError {
        let mut chain = self.visited.clone();
        chain.push(next.to_path_buf());
        ConfigError::IndirectionLoop { chain }
    }
}

/// Resolves a whole-document pointer held by the file at `current`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidResolution`] if `document` is a plain
/// string without the sigil.
pub fn redirect_target(current: &Path, document: &str) -> ConfigResult<PathBuf> {
    let target = pointer_target(document).ok_or_else(|| {
        ConfigError::invalid_resolution(current, format!("found plain string {document:?}"))
    })?;
    Ok(resolve_against(parent_dir(current), target))
}

/// Replaces every pointer value in `mapping` with the text of the file it
/// names, relative to the directory of `current`.
///
/// Substitution is single-pass: the loaded text is not scanned again.
///
/// # Errors
///
/// Returns [`ConfigError::FileNotFound`] or [`ConfigError::Io`] when a
/// referenced file cannot be read.
pub fn expand_inline(current: &Path, mapping: &mut Mapping) -> ConfigResult<()> {
    let base_dir = parent_dir(current);

    for (key, value) in mapping.iter_mut() {
        let ConfigValue::String(text) = value else {
            continue;
        };
        let Some(target) = pointer_target(text) else {
            continue;
        };

        let path = resolve_against(base_dir, target);
        let contents = fs::read_to_string(&path).map_err(|err| ConfigError::from_io(&path, err))?;
        debug!(key = %key, path = %path.display(), bytes = contents.len(), "expanded inline pointer");
        *value = ConfigValue::String(contents);
    }

    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn recognises_sigil() {
        assert_eq!(pointer_target("@@config.txt"), Some("config.txt"));
        assert_eq!(pointer_target("@@ spaced.txt "), Some("spaced.txt"));
        assert_eq!(pointer_target("@config.txt"), None);
        assert_eq!(pointer_target("config.txt"), None);
    }

    #[test]
    fn chain_rejects_revisits() {
        let mut chain = IndirectionChain::default();
        chain.enter(PathBuf::from("/a.json")).unwrap();
        chain.enter(PathBuf::from("/b.json")).unwrap();
        let err = chain.enter(PathBuf::from("/a.json")).unwrap_err();
        match err {
            ConfigError::IndirectionLoop { chain } => assert_eq!(chain.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn chain_admits_four_documents() {
        let mut chain = IndirectionChain::default();
        for name in ["/a", "/b", "/c", "/d"] {
            chain.enter(PathBuf::from(name)).unwrap();
        }
        assert_eq!(chain.len(), MAX_CHAIN_LEN);
        assert!(matches!(
            chain.enter(PathBuf::from("/e")),
            Err(ConfigError::IndirectionLoop { .. })
        ));
    }

    #[test]
    fn redirect_is_relative_to_current_file() {
        let target = redirect_target(Path::new("/cfg/entry.json"), "@@config.txt").unwrap();
        assert_eq!(target, PathBuf::from("/cfg/config.txt"));
    }

    #[test]
    fn plain_string_document_is_invalid() {
        let err = redirect_target(Path::new("/cfg/entry.json"), "hello").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidResolution { .. }));
    }

    #[test]
    fn inline_pointer_reads_sibling_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("prompt.txt"), "PROMPT BODY").unwrap();

        let mut mapping = Mapping::new();
        mapping.insert("prompt".into(), ConfigValue::from("@@prompt.txt"));
        mapping.insert("temp".into(), ConfigValue::Float(0.1));

        expand_inline(&dir.path().join("config.txt"), &mut mapping).unwrap();
        assert_eq!(mapping["prompt"], ConfigValue::from("PROMPT BODY"));
        assert_eq!(mapping["temp"], ConfigValue::Float(0.1));
    }

    #[test]
    fn inline_expansion_is_not_recursive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("outer.txt"), "@@inner.txt").unwrap();
        fs::write(dir.path().join("inner.txt"), "never read").unwrap();

        let mut mapping = Mapping::new();
        mapping.insert("prompt".into(), ConfigValue::from("@@outer.txt"));

        expand_inline(&dir.path().join("config.txt"), &mut mapping).unwrap();
        assert_eq!(mapping["prompt"], ConfigValue::from("@@inner.txt"));
    }

    #[test]
    fn missing_inline_target_is_not_found() {
        let dir = tempdir().unwrap();
        let mut mapping = Mapping::new();
        mapping.insert("prompt".into(), ConfigValue::from("@@absent.txt"));

        let err = expand_inline(&dir.path().join("config.txt"), &mut mapping).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}

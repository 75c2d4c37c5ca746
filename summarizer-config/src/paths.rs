use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

/// Expands a leading `~` to the user's home directory.
pub(crate) fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Expands `~` and makes `path` absolute against the working directory.
pub(crate) fn absolutize(path: &Path) -> ConfigResult<PathBuf> {
    let expanded = expand_home(path);
    std::path::absolute(&expanded).map_err(|source| ConfigError::Io {
        path: expanded,
        source,
    })
}

/// Resolves `target` against `base_dir` unless it is already absolute.
pub(crate) fn resolve_against(base_dir: &Path, target: &str) -> PathBuf {
    let expanded = expand_home(Path::new(target));
    if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    }
}

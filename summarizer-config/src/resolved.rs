use std::collections::btree_map;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::format::Mapping;
use crate::value::ConfigValue;

/// Fully resolved, flat configuration.
///
/// No value carries the pointer sigil: every whole-document pointer has been
/// followed and every inline pointer replaced by file contents.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConfig {
    values: Mapping,
    source: PathBuf,
}

impl ResolvedConfig {
    /// Wraps an already resolved mapping read from `source`.
    #[must_use]
    pub fn new(values: Mapping, source: impl Into<PathBuf>) -> Self {
        Self {
            values,
            source: source.into(),
        }
    }

    /// File that supplied the mapping (the last document in the chain).
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Returns the raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Returns `key` as a string slice.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    /// Returns `key` as a float, widening integers.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ConfigValue::as_f64)
    }

    /// Returns `key` as an integer.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ConfigValue::as_i64)
    }

    /// Returns `key` as a boolean.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ConfigValue::as_bool)
    }

    /// Returns `key` as a string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] or [`ConfigError::InvalidType`].
    pub fn require_str(&self, key: &str) -> ConfigResult<&str> {
        let value = self.require(key)?;
        value.as_str().ok_or_else(|| invalid_type(key, "a string", value))
    }

    /// Returns `key` as a float, widening integers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] or [`ConfigError::InvalidType`].
    pub fn require_f64(&self, key: &str) -> ConfigResult<f64> {
        let value = self.require(key)?;
        value.as_f64().ok_or_else(|| invalid_type(key, "a number", value))
    }

    fn require(&self, key: &str) -> ConfigResult<&ConfigValue> {
        self.get(key).ok_or_else(|| ConfigError::MissingKey {
            key: key.to_owned(),
        })
    }

    /// Inserts or overrides a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        self.values.insert(key.into(), value.into())
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ConfigValue> {
        self.values.iter()
    }

    /// Consumes the configuration, returning the underlying mapping.
    #[must_use]
    pub fn into_inner(self) -> Mapping {
        self.values
    }
}

impl<'a> IntoIterator for &'a ResolvedConfig {
    type Item = (&'a String, &'a ConfigValue);
    type IntoIter = btree_map::Iter<'a, String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn invalid_type(key: &str, expected: &'static str, found: &ConfigValue) -> ConfigError {
    ConfigError::InvalidType {
        key: key.to_owned(),
        expected,
        found: found.type_name(),
    }
}

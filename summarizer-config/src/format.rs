//! Format-specific parsers producing raw, unresolved documents.

use std::collections::BTreeMap;
use std::path::Path;

use ini::{Ini, ParseOption};

use crate::error::{ConfigError, ConfigResult};
use crate::value::{ConfigValue, infer_scalar};

/// Flat key/value mapping produced by every parser.
pub type Mapping = BTreeMap<String, ConfigValue>;

/// Contents of one file before pointer resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum RawDocument {
    /// Top-level string; a whole-document pointer candidate.
    Pointer(String),
    /// Flat mapping of keys to values.
    Mapping(Mapping),
    /// Any other top-level value, described by its kind.
    Other(&'static str),
}

/// Supported configuration formats, selected by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.ini`, unnamed and `[DEFAULT]` sections only.
    Ini,
    /// `.txt` with one `key = value` pair per line.
    KeyValue,
}

impl Format {
    /// Looks up the format for `path` by its lowercased extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for unknown extensions.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "ini" => Ok(Self::Ini),
            "txt" => Ok(Self::KeyValue),
            _ => Err(ConfigError::UnsupportedFormat {
                extension,
                path: path.to_path_buf(),
            }),
        }
    }

    /// Human-readable format name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Ini => "INI",
            Self::KeyValue => "key/value text",
        }
    }

    /// Parses `text`, read from `path`, into a raw document.
    ///
    /// Structured formats keep their native value types. Key/value text and
    /// INI values go through [`infer_scalar`].
    ///
    /// # Errors
    ///
    /// Returns the first syntax or shape error found in the document.
    pub fn parse(self, path: &Path, text: &str) -> ConfigResult<RawDocument> {
        match self {
            Self::Json => parse_json(path, text),
            Self::Yaml => parse_yaml(path, text),
            Self::Ini => parse_ini(path, text),
            Self::KeyValue => parse_key_value(path, text).map(RawDocument::Mapping),
        }
    }
}

fn parse_json(path: &Path, text: &str) -> ConfigResult<RawDocument> {
    use serde_json::Value;

    let value: Value =
        serde_json::from_str(text).map_err(|err| ConfigError::parse(path, "JSON", err))?;

    match value {
        Value::String(target) => Ok(RawDocument::Pointer(target)),
        Value::Object(entries) => {
            let mut mapping = Mapping::new();
            for (key, value) in entries {
                let converted = match value {
                    Value::Bool(flag) => ConfigValue::Bool(flag),
                    Value::Number(number) => json_number(&number),
                    Value::String(text) => ConfigValue::String(text),
                    Value::Array(items) => {
                        let strings = items
                            .into_iter()
                            .map(|item| match item {
                                Value::String(text) => Some(text),
                                _ => None,
                            })
                            .collect::<Option<Vec<_>>>();
                        strings.map(ConfigValue::List).ok_or_else(|| {
                            ConfigError::invalid_resolution(
                                path,
                                format!("key `{key}` must be a list of strings"),
                            )
                        })?
                    }
                    Value::Null => {
                        return Err(ConfigError::invalid_resolution(
                            path,
                            format!("key `{key}` is null"),
                        ));
                    }
                    Value::Object(_) => {
                        return Err(ConfigError::invalid_resolution(
                            path,
                            format!("key `{key}` holds a nested mapping"),
                        ));
                    }
                };
                mapping.insert(key, converted);
            }
            Ok(RawDocument::Mapping(mapping))
        }
        Value::Array(_) => Ok(RawDocument::Other("a list")),
        Value::Number(_) => Ok(RawDocument::Other("a number")),
        Value::Bool(_) => Ok(RawDocument::Other("a boolean")),
        Value::Null => Ok(RawDocument::Other("null")),
    }
}

fn json_number(number: &serde_json::Number) -> ConfigValue {
    number.as_i64().map_or_else(
        || ConfigValue::Float(number.as_f64().unwrap_or(f64::NAN)),
        ConfigValue::Integer,
    )
}

#[cfg(feature = "yaml")]
fn parse_yaml(path: &Path, text: &str) -> ConfigResult<RawDocument> {
    use serde_yaml::Value;

    let value: Value =
        serde_yaml::from_str(text).map_err(|err| ConfigError::parse(path, "YAML", err))?;

    match value {
        Value::String(target) => Ok(RawDocument::Pointer(target)),
        Value::Mapping(entries) => {
            let mut mapping = Mapping::new();
            for (key, value) in entries {
                let Value::String(key) = key else {
                    return Err(ConfigError::invalid_resolution(
                        path,
                        "mapping keys must be strings",
                    ));
                };
                let converted = match value {
                    Value::Bool(flag) => ConfigValue::Bool(flag),
                    Value::Number(number) => number.as_i64().map_or_else(
                        || ConfigValue::Float(number.as_f64().unwrap_or(f64::NAN)),
                        ConfigValue::Integer,
                    ),
                    Value::String(text) => ConfigValue::String(text),
                    Value::Sequence(items) => items
                        .into_iter()
                        .map(|item| match item {
                            Value::String(text) => Some(text),
                            _ => None,
                        })
                        .collect::<Option<Vec<_>>>()
                        .map(ConfigValue::List)
                        .ok_or_else(|| {
                            ConfigError::invalid_resolution(
                                path,
                                format!("key `{key}` must be a list of strings"),
                            )
                        })?,
                    Value::Null => {
                        return Err(ConfigError::invalid_resolution(
                            path,
                            format!("key `{key}` is null"),
                        ));
                    }
                    Value::Mapping(_) | Value::Tagged(_) => {
                        return Err(ConfigError::invalid_resolution(
                            path,
                            format!("key `{key}` holds a nested mapping"),
                        ));
                    }
                };
                mapping.insert(key, converted);
            }
            Ok(RawDocument::Mapping(mapping))
        }
        Value::Sequence(_) => Ok(RawDocument::Other("a list")),
        Value::Number(_) => Ok(RawDocument::Other("a number")),
        Value::Bool(_) => Ok(RawDocument::Other("a boolean")),
        Value::Null => Ok(RawDocument::Other("null")),
        Value::Tagged(_) => Ok(RawDocument::Other("a tagged value")),
    }
}

#[cfg(not(feature = "yaml"))]
#[allow(clippy::unnecessary_wraps)]
fn parse_yaml(path: &Path, _text: &str) -> ConfigResult<RawDocument> {
    Err(ConfigError::MissingOptionalDependency {
        format: "YAML",
        feature: "yaml",
        path: path.to_path_buf(),
    })
}

fn parse_ini(path: &Path, text: &str) -> ConfigResult<RawDocument> {
    // Values are literal; indented lines continue the previous value.
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        enabled_indented_mutiline_value: true,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(text, options).map_err(|err| ConfigError::parse(path, "INI", err))?;

    let mut mapping = Mapping::new();
    // [DEFAULT] is read after the unnamed section so its keys win.
    let sections = ini
        .section(None::<String>)
        .into_iter()
        .chain(ini.section(Some("DEFAULT")));
    for section in sections {
        for (key, value) in section.iter() {
            mapping.insert(key.trim().to_lowercase(), infer_scalar(value.trim()));
        }
    }

    Ok(RawDocument::Mapping(mapping))
}

fn parse_key_value(path: &Path, text: &str) -> ConfigResult<Mapping> {
    let mut mapping = Mapping::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let malformed = || ConfigError::MalformedLine {
            path: path.to_path_buf(),
            line_number: idx + 1,
            line: line.to_owned(),
        };

        let (key, value) = line.split_once('=').ok_or_else(malformed)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(malformed());
        }

        mapping.insert(key.to_owned(), infer_scalar(value.trim()));
    }

    Ok(mapping)
}

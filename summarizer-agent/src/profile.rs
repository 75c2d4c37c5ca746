//! Free-form profile records queued for summarization.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::error::{SummarizerError, SummarizerResult};

/// Longest raw text kept when a text profile has no `key: value` lines.
pub const RAW_TEXT_LIMIT: usize = 4_000;

/// A single attribute value in a profile record.
#[derive(Clone, Debug, PartialEq)]
pub enum ProfileValue {
    /// Free text.
    String(String),
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// Boolean flag.
    Bool(bool),
    /// List of strings, rendered comma-separated.
    List(Vec<String>),
}

impl fmt::Display for ProfileValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            // Debug keeps the fractional part of whole floats (`3.0`, not `3`).
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for ProfileValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ProfileValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i32> for ProfileValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for ProfileValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ProfileValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ProfileValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for ProfileValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for ProfileValue {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_owned).collect())
    }
}

/// A flat, string-keyed profile record.
///
/// Keys are kept sorted so rendering is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileRecord {
    fields: BTreeMap<String, ProfileValue>,
}

impl ProfileRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ProfileValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ProfileValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ProfileValue> {
        self.fields.get(key)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ProfileValue> {
        self.fields.iter()
    }

    /// Applies key/value normalization.
    #[must_use]
    pub fn normalized(self, options: NormalizeOptions) -> Self {
        let fields = self
            .fields
            .into_iter()
            .map(|(key, value)| {
                let key = if options.lower_keys {
                    key.to_lowercase()
                } else {
                    key
                };
                let value = match value {
                    ProfileValue::String(text) if options.strip_strings => {
                        ProfileValue::String(text.trim().to_owned())
                    }
                    ProfileValue::List(items) if options.strip_strings => ProfileValue::List(
                        items.into_iter().map(|item| item.trim().to_owned()).collect(),
                    ),
                    other => other,
                };
                (key, value)
            })
            .collect();
        Self { fields }
    }

    /// Converts a JSON object into a record.
    ///
    /// Scalars map directly; arrays must hold scalars, which are rendered as
    /// strings. `null` and nested objects are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizerError::InvalidProfile`] naming the offending key.
    pub fn from_json_object(
        path: &Path,
        object: serde_json::Map<String, Value>,
    ) -> SummarizerResult<Self> {
        let mut record = Self::new();
        for (key, value) in object {
            let value = match value {
                Value::String(text) => ProfileValue::String(text),
                Value::Bool(flag) => ProfileValue::Bool(flag),
                Value::Number(number) => number.as_i64().map_or_else(
                    || ProfileValue::Float(number.as_f64().unwrap_or(f64::NAN)),
                    ProfileValue::Integer,
                ),
                Value::Array(items) => ProfileValue::List(
                    items
                        .into_iter()
                        .map(|item| match item {
                            Value::String(text) => Ok(text),
                            Value::Bool(flag) => Ok(flag.to_string()),
                            Value::Number(number) => Ok(number.to_string()),
                            _ => Err(SummarizerError::invalid_profile(
                                path,
                                format!("list `{key}` may only hold scalars"),
                            )),
                        })
                        .collect::<SummarizerResult<Vec<_>>>()?,
                ),
                Value::Null => {
                    return Err(SummarizerError::invalid_profile(
                        path,
                        format!("key `{key}` is null"),
                    ));
                }
                Value::Object(_) => {
                    return Err(SummarizerError::invalid_profile(
                        path,
                        format!("key `{key}` holds a nested object"),
                    ));
                }
            };
            record.insert(key, value);
        }
        Ok(record)
    }

    /// Parses loose `key: value` text, one attribute per line.
    ///
    /// Keys are lowercased; values containing commas become lists. Lines
    /// without a colon are ignored. If no line matches, the whole text (capped
    /// at [`RAW_TEXT_LIMIT`] characters) is stored under `raw_text`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut record = Self::new();
        for line in text.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                continue;
            }
            let value = if value.contains(',') {
                ProfileValue::List(value.split(',').map(|item| item.trim().to_owned()).collect())
            } else {
                ProfileValue::from(value)
            };
            record.insert(key.to_lowercase(), value);
        }

        if record.is_empty() {
            let raw: String = text.trim().chars().take(RAW_TEXT_LIMIT).collect();
            record.insert("raw_text", raw);
        }
        record
    }
}

impl<K: Into<String>, V: Into<ProfileValue>> FromIterator<(K, V)> for ProfileRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl<'a> IntoIterator for &'a ProfileRecord {
    type Item = (&'a String, &'a ProfileValue);
    type IntoIter = btree_map::Iter<'a, String, ProfileValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Normalization applied to records read from JSON files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Lowercase every key.
    pub lower_keys: bool,
    /// Trim strings and string list items.
    pub strip_strings: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            lower_keys: true,
            strip_strings: true,
        }
    }
}

impl NormalizeOptions {
    /// Leaves keys and values untouched.
    #[must_use]
    pub const fn verbatim() -> Self {
        Self {
            lower_keys: false,
            strip_strings: false,
        }
    }
}

/// Reads one record (a JSON object) or many (an array of objects) from `path`.
///
/// # Errors
///
/// Returns [`SummarizerError::Io`] if the file cannot be read and
/// [`SummarizerError::InvalidProfile`] for malformed JSON or unexpected shapes.
pub fn read_json_records(path: &Path, options: NormalizeOptions) -> SummarizerResult<Vec<ProfileRecord>> {
    let text = std::fs::read_to_string(path).map_err(|source| SummarizerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data: Value = serde_json::from_str(&text)
        .map_err(|err| SummarizerError::invalid_profile(path, err.to_string()))?;

    match data {
        Value::Object(object) => Ok(vec![
            ProfileRecord::from_json_object(path, object)?.normalized(options),
        ]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(object) => {
                    ProfileRecord::from_json_object(path, object).map(|rec| rec.normalized(options))
                }
                other => Err(SummarizerError::invalid_profile(
                    path,
                    format!("item #{idx} is {}, expected an object", json_kind(&other)),
                )),
            })
            .collect(),
        other => Err(SummarizerError::invalid_profile(
            path,
            format!(
                "top-level JSON must be an object or a list of objects, got {}",
                json_kind(&other)
            ),
        )),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::tempdir;

    #[test]
    fn builder_collects_fields() {
        let record = ProfileRecord::new()
            .with("first_name", "Layla")
            .with("age", 28)
            .with("hobbies", vec!["kickboxing", "food blogging"]);

        assert_eq!(record.len(), 3);
        assert_eq!(record.get("age"), Some(&ProfileValue::Integer(28)));
        assert_eq!(
            record.get("hobbies").map(ToString::to_string).as_deref(),
            Some("kickboxing, food blogging")
        );
    }

    #[test]
    fn floats_keep_fraction() {
        assert_eq!(ProfileValue::Float(3.0).to_string(), "3.0");
        assert_eq!(ProfileValue::Float(0.25).to_string(), "0.25");
    }

    #[test]
    fn json_single_object_is_normalized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("single.json");
        fs::write(
            &path,
            r#"{"First_Name": "  Layla  ", "Role": " Senior Front-End Engineer ", "hobbies": [" kickboxing ", " food blogging  "]}"#,
        )
        .unwrap();

        let records = read_json_records(&path, NormalizeOptions::default()).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        let keys: Vec<_> = record.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["first_name", "hobbies", "role"]);
        assert_eq!(record.get("first_name"), Some(&ProfileValue::from("Layla")));
        assert_eq!(
            record.get("role"),
            Some(&ProfileValue::from("Senior Front-End Engineer"))
        );
        assert_eq!(
            record.get("hobbies"),
            Some(&ProfileValue::from(vec!["kickboxing", "food blogging"]))
        );
    }

    #[test]
    fn json_verbatim_keeps_keys_and_whitespace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("norm.json");
        fs::write(&path, r#"{"First_Name": "  Layla  ", "Hobbies": [" a ", " b  "]}"#).unwrap();

        let records = read_json_records(&path, NormalizeOptions::verbatim()).unwrap();
        let record = &records[0];
        assert_eq!(record.get("First_Name"), Some(&ProfileValue::from("  Layla  ")));
        assert_eq!(record.get("Hobbies"), Some(&ProfileValue::from(vec![" a ", " b  "])));
    }

    #[test]
    fn json_list_yields_many_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.json");
        fs::write(
            &path,
            r#"[{"first_name": "Layla", "age": 28}, {"first_name": "Kai", "age": 34}]"#,
        )
        .unwrap();

        let records = read_json_records(&path, NormalizeOptions::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("first_name"), Some(&ProfileValue::from("Kai")));
    }

    #[test]
    fn json_list_with_non_object_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad_list.json");
        fs::write(&path, r#"[{"ok": 1}, 3, {"ok": 2}]"#).unwrap();

        let err = read_json_records(&path, NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, SummarizerError::InvalidProfile { .. }));
        assert!(err.to_string().contains("item #1"));
    }

    #[test]
    fn json_bad_top_level_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("not_dict_or_list.json");
        fs::write(&path, r#""hello""#).unwrap();

        let err = read_json_records(&path, NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, SummarizerError::InvalidProfile { .. }));
    }

    #[test]
    fn text_profile_parses_key_values() {
        let record = ProfileRecord::from_text("Name: Jian\nHobbies: chess, running\nnot a field\n");
        assert_eq!(record.get("name"), Some(&ProfileValue::from("Jian")));
        assert_eq!(
            record.get("hobbies"),
            Some(&ProfileValue::from(vec!["chess", "running"]))
        );
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn text_profile_falls_back_to_raw_text() {
        let prose = "x".repeat(RAW_TEXT_LIMIT + 10);
        let record = ProfileRecord::from_text(&format!("  {prose}  "));
        let Some(ProfileValue::String(raw)) = record.get("raw_text") else {
            panic!("expected raw_text");
        };
        assert_eq!(raw.len(), RAW_TEXT_LIMIT);
    }
}

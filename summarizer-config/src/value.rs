//! Scalar values held by a resolved configuration.

use std::fmt;

/// A single configuration value.
///
/// Documents are flat: values are scalars or lists of strings, never nested
/// mappings.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    /// `true` / `false`.
    Bool(bool),
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// Free text, including inline pointer targets after expansion.
    String(String),
    /// List of strings (structured formats only).
    List(Vec<String>),
}

impl ConfigValue {
    /// Returns the name of the variant, used in type errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "a boolean",
            Self::Integer(_) => "an integer",
            Self::Float(_) => "a float",
            Self::String(_) => "a string",
            Self::List(_) => "a list",
        }
    }

    /// Returns the string contents if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Returns the value as an integer.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
            Self::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Infers a typed value from a plain-text token.
///
/// `true`/`false` in any case become booleans. Tokens containing a decimal
/// point are tried as floats, everything else as integers. A token that
/// parses as neither is returned unchanged as a string; this never fails.
#[must_use]
pub fn infer_scalar(token: &str) -> ConfigValue {
    let lowered = token.to_ascii_lowercase();
    if lowered == "true" {
        return ConfigValue::Bool(true);
    }
    if lowered == "false" {
        return ConfigValue::Bool(false);
    }

    let numeric = if token.contains('.') {
        token.parse::<f64>().ok().map(ConfigValue::Float)
    } else {
        token.parse::<i64>().ok().map(ConfigValue::Integer)
    };

    numeric.unwrap_or_else(|| ConfigValue::String(token.to_owned()))
}

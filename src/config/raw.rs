//! Typed, alias-aware access to the raw JSON object.

use serde_json::{Map, Value};

use crate::input::{split_lines, tokenize_paste};

use super::ConfigError;

/// How a string-valued list key is split into entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListSplit {
    /// One entry per non-blank line.
    Lines,
    /// Runs of whitespace, `,` and `;`.
    Tokens,
}

/// The parsed top-level config object.
///
/// Every accessor takes a key list: the canonical key first, then aliases.
/// The first key present wins. A JSON `null` counts as absent.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawConfig {
    values: Map<String, Value>,
}

impl RawConfig {
    pub(crate) fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// First present, non-null key and its value.
    fn lookup<'k>(&self, keys: &[&'k str]) -> Option<(&'k str, &Value)> {
        keys.iter().find_map(|key| {
            self.values
                .get(*key)
                .filter(|value| !value.is_null())
                .map(|value| (*key, value))
        })
    }

    pub(crate) fn string(&self, keys: &[&str], default: &str) -> Result<String, ConfigError> {
        match self.lookup(keys) {
            None => Ok(default.to_string()),
            Some((_, Value::String(text))) => Ok(text.trim().to_string()),
            Some((_, Value::Number(number))) => Ok(number.to_string()),
            Some((key, _)) => Err(invalid_type(key, "a string")),
        }
    }

    pub(crate) fn bool(&self, keys: &[&str], default: bool) -> Result<bool, ConfigError> {
        let Some((key, value)) = self.lookup(keys) else {
            return Ok(default);
        };
        let parsed = match value {
            Value::Bool(flag) => Some(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Some(true),
                "0" | "false" | "no" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed.ok_or_else(|| ConfigError::InvalidType {
            field: key.to_string(),
            expected: "a boolean (true/false, yes/no, on/off, 1/0)",
        })
    }

    pub(crate) fn integer(&self, keys: &[&str], default: i64) -> Result<i64, ConfigError> {
        Ok(self.optional_integer(keys)?.unwrap_or(default))
    }

    pub(crate) fn optional_integer(&self, keys: &[&str]) -> Result<Option<i64>, ConfigError> {
        let Some((key, value)) = self.lookup(keys) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(number) => number.as_i64(),
            Value::String(text) if text.trim().is_empty() => return Ok(None),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| invalid_type(key, "an integer"))
    }

    pub(crate) fn float(&self, keys: &[&str], default: f64) -> Result<f64, ConfigError> {
        let Some((key, value)) = self.lookup(keys) else {
            return Ok(default);
        };
        let parsed = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        };
        parsed
            .filter(|number| number.is_finite())
            .ok_or_else(|| invalid_type(key, "a number"))
    }

    pub(crate) fn list(&self, keys: &[&str], split: ListSplit) -> Result<Vec<String>, ConfigError> {
        let Some((key, value)) = self.lookup(keys) else {
            return Ok(Vec::new());
        };
        match value {
            Value::String(text) => Ok(match split {
                ListSplit::Lines => split_lines(text),
                ListSplit::Tokens => tokenize_paste(text),
            }),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Null => None,
                    Value::String(text) => {
                        let trimmed = text.trim();
                        (!trimmed.is_empty()).then(|| Ok(trimmed.to_string()))
                    }
                    Value::Number(number) => Some(Ok(number.to_string())),
                    _ => Some(Err(invalid_type(key, "a string or an array of strings"))),
                })
                .collect(),
            _ => Err(invalid_type(key, "a string or an array of strings")),
        }
    }
}

fn invalid_type(key: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidType {
        field: key.to_string(),
        expected,
    }
}

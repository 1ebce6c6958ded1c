//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::input::InputError;

/// Errors that can occur while loading or validating the JSON config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config did not exist; a template was written in its place
    #[error(
        "config file not found; a template has been created at '{}'\n  Suggestion: Edit it and run again",
        .path.display()
    )]
    TemplateCreated {
        /// Where the template was written
        path: PathBuf,
    },

    /// The template could not be written
    #[error("could not create config template at '{}': {source}", .path.display())]
    TemplateWrite {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config exists but could not be read
    #[error("could not read config '{}': {source}", .path.display())]
    Read {
        /// Config path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Only JSON configs are supported
    #[error(
        "unsupported config format for '{}'\n  Suggestion: Use a .json config file",
        .path.display()
    )]
    UnsupportedFormat {
        /// Config path
        path: PathBuf,
    },

    /// Malformed JSON
    #[error(
        "invalid JSON format in '{}' at line {line}, column {column}: {message}",
        .path.display()
    )]
    InvalidJson {
        /// Config path
        path: PathBuf,
        /// 1-based line of the syntax error
        line: usize,
        /// 1-based column of the syntax error
        column: usize,
        /// Parser message without the position suffix
        message: String,
    },

    /// Top-level JSON value is not an object
    #[error("config '{}' must contain a JSON object at the top level", .path.display())]
    NotAnObject {
        /// Config path
        path: PathBuf,
    },

    /// A key holds a value of the wrong JSON type
    #[error("invalid value for `{field}`: expected {expected}")]
    InvalidType {
        /// Config key
        field: String,
        /// What was expected
        expected: &'static str,
    },

    /// A key holds an out-of-range or otherwise unacceptable value
    #[error("invalid config value: {reason}")]
    InvalidValue {
        /// Config key
        field: &'static str,
        /// Rule that was broken
        reason: String,
    },

    /// Input sources could not be expanded into links
    #[error(transparent)]
    Input(#[from] InputError),
}

impl ConfigError {
    pub(crate) fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }

    /// Returns true when the run should end quietly after creating a template.
    #[must_use]
    pub fn is_template_created(&self) -> bool {
        matches!(self, Self::TemplateCreated { .. })
    }
}

//! Error types for input selection and multipart patterns.

use thiserror::Error;

/// Errors raised while turning config inputs into candidate links.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// IDs were given but the template cannot expand them
    #[error(
        "`id_url_template` must contain {{id}} when `{source_field}` contains IDs\n  Suggestion: Set id_url_template, e.g. \"https://host.example/file/{{id}}\""
    )]
    MissingIdTemplate {
        /// Config key that carried the IDs
        source_field: &'static str,
    },

    /// Generated mode needs an absolute base URL
    #[error(
        "`base_url` must be an absolute URL (got '{value}')\n  Suggestion: Use a full URL such as https://host.example/files"
    )]
    InvalidBaseUrl {
        /// The configured value
        value: String,
    },

    /// Generated mode needs an index placeholder
    #[error(
        "`filename_pattern` must contain {{index}} or {{index_raw}} (got '{pattern}')\n  Suggestion: Use a pattern such as Game.part{{index}}.rar, or set source_url"
    )]
    MissingIndexPlaceholder {
        /// The configured pattern
        pattern: String,
    },
}

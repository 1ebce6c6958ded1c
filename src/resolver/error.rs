//! Error types for resolver operations.
//!
//! This module defines structured errors for landing-page resolution,
//! following the What/Why/Fix pattern used across the project.

use thiserror::Error;

/// Errors that can occur during landing-page resolution.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// No registered resolver can handle the input
    #[error("no resolver found for '{input}': {reason}\n  Suggestion: {suggestion}")]
    NoResolver {
        /// The input that no resolver could handle
        input: String,
        /// Why no resolver matched
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// A specific resolver failed to resolve the input
    #[error("resolution failed for '{input}': {reason}\n  Suggestion: {suggestion}")]
    ResolutionFailed {
        /// The input that failed resolution
        input: String,
        /// Why resolution failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// All applicable resolvers failed
    #[error(
        "download button link not found for '{input}': {}\n  Suggestion: Open the page in a browser and paste the direct link, or enable selenium_fallback_enabled",
        .reasons.join("; ")
    )]
    AllResolversFailed {
        /// The input that all resolvers failed on
        input: String,
        /// Per-resolver failure reasons, in the order they were tried
        reasons: Vec<String>,
    },
}

impl ResolveError {
    /// Creates a `NoResolver` error for input with no matching resolver.
    #[must_use]
    pub fn no_resolver(input: &str) -> Self {
        Self::NoResolver {
            input: input.to_string(),
            reason: "no registered resolver can handle this input".to_string(),
            suggestion: "Check that the link is an absolute http(s) URL".to_string(),
        }
    }

    /// Creates a `ResolutionFailed` error.
    #[must_use]
    pub fn resolution_failed(input: &str, reason: &str) -> Self {
        Self::ResolutionFailed {
            input: input.to_string(),
            reason: reason.to_string(),
            suggestion: "Check the link and try again".to_string(),
        }
    }

    /// Creates an `AllResolversFailed` error.
    #[must_use]
    pub fn all_failed(input: &str, reasons: Vec<String>) -> Self {
        Self::AllResolversFailed {
            input: input.to_string(),
            reasons,
        }
    }

    /// Short reason without input echo or suggestion, for per-link log lines.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::NoResolver { reason, .. } | Self::ResolutionFailed { reason, .. } => {
                reason.clone()
            }
            Self::AllResolversFailed { reasons, .. } => {
                if reasons.is_empty() {
                    "download button link not found".to_string()
                } else {
                    format!("download button link not found; {}", reasons.join("; "))
                }
            }
        }
    }
}

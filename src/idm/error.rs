//! Error types for download-manager invocation.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors from calling the IDM command-line interface.
#[derive(Debug, Error)]
pub enum IdmError {
    /// No executable configured and auto-detection found none
    #[error(
        "IDM executable not configured\n  Suggestion: Set idm_path in the config or install Internet Download Manager"
    )]
    NotConfigured,

    /// The configured executable does not exist
    #[error(
        "IDM executable not found at '{}'\n  Suggestion: Fix idm_path in the config",
        .path.display()
    )]
    NotFound {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// The launch shortcut does not exist
    #[error(
        "IDM shortcut not found at '{}'\n  Suggestion: Fix idm_shortcut_path or set launch_idm_shortcut to false",
        .path.display()
    )]
    ShortcutNotFound {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// The process could not be started
    #[error("failed to start IDM ({action}): {source}")]
    Spawn {
        /// `queue`, `start` or `shortcut`
        action: &'static str,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The process did not finish in time
    #[error("IDM {action} call timed out after {}s", .timeout.as_secs())]
    Timeout {
        /// `queue`, `start` or `shortcut`
        action: &'static str,
        /// Limit that was exceeded
        timeout: Duration,
    },

    /// The process exited with a failure code
    #[error("IDM {action} call exited with code {code:?}")]
    NonZeroExit {
        /// `queue`, `start` or `shortcut`
        action: &'static str,
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
    },
}

impl IdmError {
    /// True when the run cannot continue (the executable is gone).
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::NotConfigured | Self::NotFound { .. } | Self::ShortcutNotFound { .. } => true,
            Self::Spawn { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            Self::Timeout { .. } | Self::NonZeroExit { .. } => false,
        }
    }
}

//! Resume state: URLs queued by earlier runs.
//!
//! Stored as `{"updated_at": "<RFC 3339>", "queued_urls": [...]}` with the
//! URLs sorted. Writes go through a temp file in the same directory and a
//! rename so a crash never leaves a truncated state file.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Errors while persisting resume state.
#[derive(Debug, Error)]
pub enum ResumeError {
    /// The state directory or temp file could not be written
    #[error("could not write resume state '{}': {source}", .path.display())]
    Write {
        /// Target state file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The state could not be serialized
    #[error("could not serialize resume state: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct ResumeFile {
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    queued_urls: Vec<String>,
}

/// Loads the set of previously queued URLs.
///
/// A missing file is an empty set; an unreadable or malformed one is an empty
/// set plus a warning.
#[must_use]
pub fn load_resume_state(path: &Path) -> BTreeSet<String> {
    if !path.exists() {
        debug!(path = %path.display(), "No resume state yet");
        return BTreeSet::new();
    }
    let parsed = fs::read_to_string(path)
        .map_err(|error| error.to_string())
        .and_then(|text| {
            serde_json::from_str::<ResumeFile>(&text).map_err(|error| error.to_string())
        });
    match parsed {
        Ok(file) => file
            .queued_urls
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect(),
        Err(error) => {
            warn!(path = %path.display(), %error, "Could not read resume state; starting empty");
            BTreeSet::new()
        }
    }
}

/// Writes the resume set atomically.
///
/// # Errors
///
/// Returns [`ResumeError`] when the directory, temp file or rename fails.
pub fn save_resume_state(path: &Path, queued: &BTreeSet<String>) -> Result<(), ResumeError> {
    let to_error = |source| ResumeError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(to_error)?;

    let body = serde_json::to_string_pretty(&ResumeFile {
        updated_at: Some(Utc::now()),
        queued_urls: queued.iter().cloned().collect(),
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(to_error)?;
    temp.write_all(body.as_bytes()).map_err(to_error)?;
    temp.write_all(b"\n").map_err(to_error)?;
    temp.as_file().sync_all().map_err(to_error)?;
    temp.persist(path).map_err(|error| to_error(error.error))?;
    debug!(path = %path.display(), count = queued.len(), "Resume state saved");
    Ok(())
}

fn decoded_lower(value: &str) -> String {
    urlencoding::decode(value)
        .map_or_else(|_| value.to_string(), std::borrow::Cow::into_owned)
        .to_lowercase()
}

/// Strings that identify `url` in IDM's state files, lowercased.
///
/// The URL without its fragment, the path's last segment and the fragment's
/// last segment; empty tokens are dropped.
#[must_use]
pub fn resume_tokens(url: &str) -> Vec<String> {
    let trimmed = url.trim();
    let (without_fragment, fragment) = match trimmed.split_once('#') {
        Some((head, tail)) => (head, Some(tail)),
        None => (trimmed, None),
    };

    let mut tokens = vec![without_fragment.to_lowercase()];

    let path_name = Url::parse(without_fragment).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(ToString::to_string))
    });
    if let Some(name) = path_name {
        tokens.push(decoded_lower(&name));
    }
    if let Some(name) = fragment.and_then(|f| f.rsplit('/').next()) {
        tokens.push(decoded_lower(name));
    }

    let mut seen = BTreeSet::new();
    tokens
        .into_iter()
        .filter(|token| !token.is_empty() && seen.insert(token.clone()))
        .collect()
}

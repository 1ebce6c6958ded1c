//! Input selection: which of the four link sources feeds this run.
//!
//! Sources are tried in a fixed priority order and the first non-empty one
//! wins outright:
//!
//! 1. `paste_input` - a pasted block of URLs and/or IDs
//! 2. `input_urls` - an explicit URL list
//! 3. `input_ids` - IDs expanded through `id_url_template`
//! 4. generated multipart sequence (see [`MultipartPattern`])

mod error;
mod generator;
mod pattern;

pub use error::InputError;
pub use generator::generate_multipart;
pub use pattern::{MultipartPattern, derive_pattern_from_source_url};

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::resolver::compile_static_regex;

static PASTE_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"[\s,;]+"));

/// Placeholder replaced by each ID in `id_url_template`.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Which source produced the candidate links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// `paste_input`
    Paste,
    /// `input_urls`
    Urls,
    /// `input_ids`
    Ids,
    /// `base_url` + `filename_pattern`
    Generated,
}

impl InputMode {
    /// Config-facing name of the mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paste => "paste_input",
            Self::Urls => "input_urls",
            Self::Ids => "input_ids",
            Self::Generated => "generated",
        }
    }

    /// True for the modes that carry an explicit link list.
    #[must_use]
    pub fn is_explicit(self) -> bool {
        !matches!(self, Self::Generated)
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw, already-normalized entries of the explicit sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSources {
    /// Tokens from `paste_input`.
    pub paste: Vec<String>,
    /// Entries from `input_urls`.
    pub urls: Vec<String>,
    /// Entries from `input_ids`.
    pub ids: Vec<String>,
    /// `id_url_template`.
    pub id_url_template: String,
}

/// The winning source and its candidate links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedInput {
    /// Which source won.
    pub mode: InputMode,
    /// Candidate links; empty in generated mode.
    pub urls: Vec<String>,
}

/// Picks the highest-priority non-empty source and expands it into links.
///
/// # Errors
///
/// Returns [`InputError::MissingIdTemplate`] when IDs must be expanded but
/// `id_url_template` lacks `{id}`.
pub fn select_input(sources: &InputSources) -> Result<SelectedInput, InputError> {
    if !sources.paste.is_empty() {
        let urls = sources
            .paste
            .iter()
            .map(|token| {
                if is_absolute_url(token) {
                    Ok(token.clone())
                } else {
                    expand_id(&sources.id_url_template, token, "paste_input")
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(SelectedInput {
            mode: InputMode::Paste,
            urls,
        });
    }

    if !sources.urls.is_empty() {
        return Ok(SelectedInput {
            mode: InputMode::Urls,
            urls: sources.urls.clone(),
        });
    }

    if !sources.ids.is_empty() {
        let urls = sources
            .ids
            .iter()
            .map(|id| expand_id(&sources.id_url_template, id, "input_ids"))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(SelectedInput {
            mode: InputMode::Ids,
            urls,
        });
    }

    Ok(SelectedInput {
        mode: InputMode::Generated,
        urls: Vec::new(),
    })
}

fn expand_id(template: &str, id: &str, source_field: &'static str) -> Result<String, InputError> {
    if !template.contains(ID_PLACEHOLDER) {
        return Err(InputError::MissingIdTemplate { source_field });
    }
    Ok(template.replace(ID_PLACEHOLDER, id.trim()))
}

/// Splits a pasted block on runs of whitespace, `,` and `;`.
#[must_use]
pub fn tokenize_paste(raw: &str) -> Vec<String> {
    PASTE_SEPARATOR_RE
        .split(raw)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Splits a multiline string into trimmed, non-blank lines.
#[must_use]
pub fn split_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Drops repeated entries, keeping the first occurrence.
#[must_use]
pub fn dedupe_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Returns true if `value` parses as a URL with both a scheme and a host.
#[must_use]
pub fn is_absolute_url(value: &str) -> bool {
    Url::parse(value.trim()).is_ok_and(|url| url.host_str().is_some_and(|host| !host.is_empty()))
}

//! Multipart URL patterns: `{index}` templating and `source_url` derivation.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::resolver::compile_static_regex;

use super::{InputError, is_absolute_url};

/// Zero-padded part number.
pub const INDEX_PLACEHOLDER: &str = "{index}";
/// Unpadded part number.
pub const INDEX_RAW_PLACEHOLDER: &str = "{index_raw}";
/// Base URL without trailing slash.
pub const BASE_URL_PLACEHOLDER: &str = "{base_url}";

static PART_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?i)part\d+"));

static TRAILING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(\d+)\.[A-Za-z0-9]{2,5}(?:$|[?#])"));

/// Turns an example part URL into a pattern.
///
/// The first `part<digits>` (any case) becomes `part{index}`; failing that,
/// the digits right before a 2-5 character extension become `{index}`. The
/// input is returned unchanged when neither matches.
#[must_use]
pub fn derive_pattern_from_source_url(source_url: &str) -> String {
    if let Some(found) = PART_NUMBER_RE.find(source_url) {
        return format!(
            "{}part{INDEX_PLACEHOLDER}{}",
            &source_url[..found.start()],
            &source_url[found.end()..]
        );
    }

    if let Some(digits) = TRAILING_NUMBER_RE
        .captures(source_url)
        .and_then(|caps| caps.get(1))
    {
        return format!(
            "{}{INDEX_PLACEHOLDER}{}",
            &source_url[..digits.start()],
            &source_url[digits.end()..]
        );
    }

    source_url.to_string()
}

/// `base_url` + `filename_pattern` + `padding` for generated mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPattern {
    base_url: String,
    filename_pattern: String,
    padding: usize,
}

impl MultipartPattern {
    /// Creates a pattern; call [`MultipartPattern::validate`] before use.
    #[must_use]
    pub fn new(base_url: impl Into<String>, filename_pattern: impl Into<String>, padding: usize) -> Self {
        Self {
            base_url: base_url.into(),
            filename_pattern: filename_pattern.into(),
            padding,
        }
    }

    /// Checks that the base URL is absolute and the pattern has an index placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidBaseUrl`] or [`InputError::MissingIndexPlaceholder`].
    pub fn validate(&self) -> Result<(), InputError> {
        if !is_absolute_url(&self.base_url) {
            return Err(InputError::InvalidBaseUrl {
                value: self.base_url.clone(),
            });
        }
        if !self.filename_pattern.contains(INDEX_PLACEHOLDER)
            && !self.filename_pattern.contains(INDEX_RAW_PLACEHOLDER)
        {
            return Err(InputError::MissingIndexPlaceholder {
                pattern: self.filename_pattern.clone(),
            });
        }
        Ok(())
    }

    fn trimmed_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Builds the URL for part `index`.
    ///
    /// An expanded pattern that is already an http(s) URL is used as-is;
    /// anything else is joined to the base URL with a single `/`.
    #[must_use]
    pub fn build_url(&self, index: u64) -> String {
        let padded = format!("{index:0>width$}", width = self.padding);
        let candidate = self
            .filename_pattern
            .replace(INDEX_RAW_PLACEHOLDER, &index.to_string())
            .replace(INDEX_PLACEHOLDER, &padded)
            .replace(BASE_URL_PLACEHOLDER, self.trimmed_base());

        if candidate.starts_with("http://") || candidate.starts_with("https://") {
            return candidate;
        }
        format!("{}/{}", self.trimmed_base(), candidate.trim_start_matches('/'))
    }

    /// Filename for a generated part: the URL path's last segment, or `part_<index>`.
    #[must_use]
    pub fn filename_for(url: &str, index: u64) -> String {
        Url::parse(url)
            .ok()
            .and_then(|parsed| {
                parsed
                    .path_segments()
                    .and_then(|mut segments| segments.next_back().map(ToString::to_string))
            })
            .filter(|name| !name.is_empty())
            .map(|name| {
                urlencoding::decode(&name)
                    .map(std::borrow::Cow::into_owned)
                    .unwrap_or(name)
            })
            .unwrap_or_else(|| format!("part_{index}"))
    }
}

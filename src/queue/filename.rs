//! Target filenames for links queued from explicit input.

use std::borrow::Cow;

use url::Url;

/// Derives the IDM `/f` filename for an explicit link.
///
/// Prefers a fragment whose last segment ends in `.rar` (hosts that put the
/// real name after `#`), then the path's last segment when it has an
/// extension, then `file_<index>`. Percent-encoding is decoded and the
/// result is made safe for Windows filesystems.
#[must_use]
pub fn filename_from_url(url: &str, index: u64) -> String {
    let fallback = || format!("file_{index}");
    let Ok(parsed) = Url::parse(url) else {
        return fallback();
    };

    let from_fragment = parsed
        .fragment()
        .and_then(|fragment| fragment.rsplit('/').next())
        .map(decode)
        .filter(|name| name.to_ascii_lowercase().ends_with(".rar"));

    let from_path = || {
        parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(decode)
            .filter(|name| name.contains('.'))
    };

    from_fragment
        .or_else(from_path)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.trim_matches(['_', '.']).is_empty())
        .unwrap_or_else(fallback)
}

fn decode(value: &str) -> String {
    urlencoding::decode(value).map_or_else(|_| value.to_string(), Cow::into_owned)
}

/// Replaces characters that are invalid in Windows filenames.
///
/// Path separators, `: * ? " < > |` and control characters become `_`;
/// trailing dots and spaces are trimmed.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    sanitized.trim().trim_end_matches('.').to_string()
}

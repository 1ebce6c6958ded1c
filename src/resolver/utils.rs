//! Shared utilities for resolver modules: static regexes, URL joining and direct-link checks.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Inline-script download button: `window.open('<url>')`.
pub static WINDOW_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?i)window\.open\(\s*['"]([^'"]+)['"]"#)
});

/// Anchor whose target already points at a `/dl/` direct path.
pub static HREF_DL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"(?i)href\s*=\s*['"]([^'"]*/dl/[^'"]*)['"]"#));

/// Returns true if the URL path contains the `/dl/` direct-download segment.
///
/// Unparseable input falls back to a plain substring check on the text
/// before any query or fragment.
#[must_use]
pub fn is_direct_dl_path(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().contains("/dl/"),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .is_some_and(|head| head.contains("/dl/")),
    }
}

/// Returns true if `value` parses as an absolute `http`/`https` URL with a host.
#[must_use]
pub fn is_http_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
    })
}

/// Resolves a possibly relative URL string against a base URL.
///
/// Protocol-relative values (`//host/...`) take the base URL's scheme.
/// Returns `None` unless the result is an absolute http(s) URL.
#[must_use]
pub fn absolutize_url(value: &str, base_url: &Url) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let joined = if let Some(rest) = value.strip_prefix("//") {
        Url::parse(&format!("{}://{rest}", base_url.scheme())).ok()?
    } else {
        base_url.join(value).ok()?
    };
    let joined = joined.to_string();
    is_http_url(&joined).then_some(joined)
}

/// Every non-empty first capture of `regex` in `html`, trimmed, in document order.
pub fn extract_captures<'h>(html: &'h str, regex: &'h Regex) -> impl Iterator<Item = &'h str> + 'h {
    regex
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_direct_dl_path_detects_segment() {
        assert!(is_direct_dl_path("https://host.example/dl/abc123"));
        assert!(!is_direct_dl_path("https://host.example/file/abc123"));
    }

    #[test]
    fn test_is_direct_dl_path_ignores_query_and_fragment() {
        assert!(!is_direct_dl_path("https://host.example/file?next=/dl/x"));
        assert!(!is_direct_dl_path("https://host.example/file#/dl/x"));
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://example.com/a.rar"));
        assert!(is_http_url("http://example.com"));
        assert!(!is_http_url("ftp://example.com/a.rar"));
        assert!(!is_http_url("example.com/a.rar"));
        assert!(!is_http_url("abc123"));
    }

    #[test]
    fn test_absolutize_url_absolute_unchanged() {
        let base = Url::parse("https://example.com/foo/").unwrap();
        assert_eq!(
            absolutize_url("https://other.com/path", &base),
            Some("https://other.com/path".to_string())
        );
    }

    #[test]
    fn test_absolutize_url_protocol_relative_uses_base_scheme() {
        let base = Url::parse("http://example.com/foo/").unwrap();
        assert_eq!(
            absolutize_url("//cdn.example.com/dl/x", &base),
            Some("http://cdn.example.com/dl/x".to_string())
        );
    }

    #[test]
    fn test_absolutize_url_relative_and_root_relative() {
        let base = Url::parse("https://example.com/foo/page").unwrap();
        assert_eq!(
            absolutize_url("bar", &base),
            Some("https://example.com/foo/bar".to_string())
        );
        assert_eq!(
            absolutize_url("/dl/abc", &base),
            Some("https://example.com/dl/abc".to_string())
        );
    }

    #[test]
    fn test_absolutize_url_rejects_non_http_targets() {
        let base = Url::parse("https://example.com/").unwrap();
        assert_eq!(absolutize_url("javascript:void(0)", &base), None);
        assert_eq!(absolutize_url("   ", &base), None);
    }

    #[test]
    fn test_window_open_regex_case_insensitive() {
        let html = r#"<button onclick="WINDOW.OPEN( 'https://x.example/dl/1' )">Go</button>"#;
        assert_eq!(
            extract_captures(html, &WINDOW_OPEN_RE).next(),
            Some("https://x.example/dl/1")
        );
    }

    #[test]
    fn test_href_dl_regex_requires_dl_segment() {
        assert_eq!(
            extract_captures(r#"<a href="/files/a.rar">x</a>"#, &HREF_DL_RE).next(),
            None
        );
        assert_eq!(
            extract_captures(r#"<a href='/dl/a1b2'>x</a>"#, &HREF_DL_RE).next(),
            Some("/dl/a1b2")
        );
    }

    #[test]
    fn test_href_dl_regex_case_insensitive_and_yields_all() {
        let html = r#"<A HREF="/dl/first">a</A><a Href='/dl/second'>b</a>"#;
        assert_eq!(
            extract_captures(html, &HREF_DL_RE).collect::<Vec<_>>(),
            vec!["/dl/first", "/dl/second"]
        );
    }
}

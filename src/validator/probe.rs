//! Probe responses and the header parsing behind them.

use reqwest::header::{
    CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, HeaderMap, HeaderName,
};
use thiserror::Error;

/// What a single HEAD (or ranged GET) told us about a link.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeResponse {
    /// URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Total size in bytes, 0 when unknown.
    pub size_bytes: u64,
    /// Lowercased `Content-Type`, empty when absent.
    pub content_type: String,
    /// Filename from `Content-Disposition`, if any.
    pub disposition_filename: Option<String>,
}

impl ProbeResponse {
    /// Builds a probe result from a response's URL, status and headers.
    #[must_use]
    pub fn from_parts(final_url: impl Into<String>, status: u16, headers: &HeaderMap) -> Self {
        let header = move |name: HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
        };

        let size_bytes = header(CONTENT_RANGE)
            .and_then(content_range_total)
            .or_else(|| header(CONTENT_LENGTH).and_then(|v| v.parse::<u64>().ok()))
            .unwrap_or(0);

        Self {
            final_url: final_url.into(),
            status,
            size_bytes,
            content_type: header(CONTENT_TYPE)
                .unwrap_or_default()
                .to_ascii_lowercase(),
            disposition_filename: header(CONTENT_DISPOSITION).and_then(parse_content_disposition),
        }
    }

    /// Builds a probe result from a live `reqwest` response.
    #[must_use]
    pub fn from_response(response: &reqwest::Response) -> Self {
        Self::from_parts(
            response.url().as_str(),
            response.status().as_u16(),
            response.headers(),
        )
    }

    /// Returns true for the statuses a direct file link may answer with.
    #[must_use]
    pub fn is_ok_status(&self) -> bool {
        matches!(self.status, 200 | 206)
    }
}

/// A probe attempt that never got a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The request hit `request_timeout`.
    #[error("request timed out")]
    Timeout,
    /// Connection, TLS, redirect or protocol failure.
    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(error.to_string())
        }
    }
}

/// Total length from a `Content-Range` value such as `bytes 0-0/1048576`.
///
/// Returns `None` for an unknown total (`*`) or a malformed header.
#[must_use]
pub fn content_range_total(value: &str) -> Option<u64> {
    let total = value.rsplit('/').next()?.trim();
    if total.is_empty() || !total.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    total.parse().ok()
}

/// Parses a `Content-Disposition` header to extract the filename.
///
/// Handles both:
/// - `attachment; filename="example.rar"`
/// - `attachment; filename=example.rar`
/// - `attachment; filename*=UTF-8''example.rar` (RFC 5987)
#[must_use]
pub fn parse_content_disposition(header: &str) -> Option<String> {
    let lower = header.to_ascii_lowercase();

    if let Some(pos) = lower.find("filename*=") {
        let value = header[pos + 10..].trim();
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            let encoded_name = encoded[..end].trim().trim_matches('"');
            if let Ok(decoded) = urlencoding::decode(encoded_name)
                && !decoded.is_empty()
            {
                return Some(decoded.into_owned());
            }
        }
    }

    let pos = lower.find("filename=")?;
    let value = header[pos + 9..].trim();
    if let Some(stripped) = value.strip_prefix('"') {
        let end = stripped.find('"')?;
        let name = &stripped[..end];
        return (!name.is_empty()).then(|| name.to_string());
    }
    let end = value.find(';').unwrap_or(value.len());
    let name = value[..end].trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(reqwest::header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_content_range_total_parses_total() {
        assert_eq!(content_range_total("bytes 0-0/10485760"), Some(10_485_760));
        assert_eq!(content_range_total("bytes 0-0/*"), None);
        assert_eq!(content_range_total("garbage"), None);
    }

    #[test]
    fn test_from_parts_prefers_content_range_total() {
        let map = headers(&[
            (CONTENT_LENGTH, "1"),
            (CONTENT_RANGE, "bytes 0-0/10485760"),
        ]);
        let probe = ProbeResponse::from_parts("https://x.example/a.rar", 206, &map);
        assert_eq!(probe.size_bytes, 10_485_760);
    }

    #[test]
    fn test_from_parts_uses_content_length() {
        let map = headers(&[(CONTENT_LENGTH, "6291456"), (CONTENT_TYPE, "Application/Octet-Stream")]);
        let probe = ProbeResponse::from_parts("https://x.example/a.rar", 200, &map);
        assert_eq!(probe.size_bytes, 6_291_456);
        assert_eq!(probe.content_type, "application/octet-stream");
        assert!(probe.is_ok_status());
    }

    #[test]
    fn test_from_parts_missing_headers_defaults() {
        let probe = ProbeResponse::from_parts("https://x.example/a", 404, &HeaderMap::new());
        assert_eq!(probe.size_bytes, 0);
        assert_eq!(probe.content_type, "");
        assert_eq!(probe.disposition_filename, None);
        assert!(!probe.is_ok_status());
    }

    #[test]
    fn test_parse_content_disposition_variants() {
        assert_eq!(
            parse_content_disposition(r#"attachment; filename="Game.part01.rar""#),
            Some("Game.part01.rar".to_string())
        );
        assert_eq!(
            parse_content_disposition("attachment; FILENAME=Game.part02.rar; size=5"),
            Some("Game.part02.rar".to_string())
        );
        assert_eq!(
            parse_content_disposition("attachment; filename*=UTF-8''Game%20Set.part03.rar"),
            Some("Game Set.part03.rar".to_string())
        );
        assert_eq!(parse_content_disposition("inline"), None);
    }

    #[test]
    fn test_probe_error_display() {
        assert_eq!(ProbeError::Timeout.to_string(), "request timed out");
        assert_eq!(
            ProbeError::Request("connection refused".to_string()).to_string(),
            "connection refused"
        );
    }
}

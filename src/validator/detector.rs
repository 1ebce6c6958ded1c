//! Content predicates: landing-page detection and RAR recognition.

use url::Url;

use super::probe::ProbeResponse;

const HTML_CONTENT_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];
const RAR_CONTENT_TYPES: [&str; 2] = ["application/x-rar-compressed", "application/vnd.rar"];

/// Decides whether a probed link is a landing/ad page rather than a file.
///
/// Hosts differ in how they disguise landing pages, so this is a seam rather
/// than a fixed rule.
pub trait LandingPageDetector: Send + Sync {
    /// Returns true when the response looks like an HTML page.
    fn looks_like_landing_page(&self, probe: &ProbeResponse) -> bool;
}

/// Default detector: HTML and XHTML content types are landing pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentTypeDetector;

impl LandingPageDetector for ContentTypeDetector {
    fn looks_like_landing_page(&self, probe: &ProbeResponse) -> bool {
        HTML_CONTENT_TYPES
            .iter()
            .any(|mime| probe.content_type.contains(mime))
    }
}

fn ends_with_rar(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".rar")
}

fn last_segment(value: &str) -> &str {
    value.rsplit('/').next().unwrap_or(value)
}

fn url_names_rar(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let path_name = last_segment(parsed.path());
    if ends_with_rar(&urlencoding::decode(path_name).unwrap_or_default()) {
        return true;
    }
    parsed.fragment().is_some_and(|fragment| {
        ends_with_rar(&urlencoding::decode(last_segment(fragment)).unwrap_or_default())
    })
}

/// Returns true when the requested URL, the post-redirect URL, the
/// `Content-Disposition` filename or the content type identify a RAR archive.
#[must_use]
pub fn looks_like_rar_target(requested_url: &str, probe: &ProbeResponse) -> bool {
    if url_names_rar(requested_url) || url_names_rar(&probe.final_url) {
        return true;
    }
    if probe
        .disposition_filename
        .as_deref()
        .is_some_and(ends_with_rar)
    {
        return true;
    }
    RAR_CONTENT_TYPES
        .iter()
        .any(|mime| probe.content_type.contains(mime))
}

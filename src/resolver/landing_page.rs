//! Landing-page resolver that extracts the download button target from HTML.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;
use url::Url;

use super::http_client::{HttpClientSettings, build_http_client};
use super::utils::{
    HREF_DL_RE, WINDOW_OPEN_RE, absolutize_url, extract_captures, is_direct_dl_path,
    is_http_url,
};
use super::{
    ResolveContext, ResolveError, ResolveMethod, ResolveStep, ResolvedUrl, Resolver,
    ResolverPriority,
};

/// One download-button marker and the method it reports on a match.
struct ExtractionRule {
    method: ResolveMethod,
    pattern: &'static LazyLock<Regex>,
}

/// Markers tried in order against the page body.
static EXTRACTION_RULES: [ExtractionRule; 2] = [
    ExtractionRule {
        method: ResolveMethod::WindowOpen,
        pattern: &WINDOW_OPEN_RE,
    },
    ExtractionRule {
        method: ResolveMethod::HrefDl,
        pattern: &HREF_DL_RE,
    },
];

/// Extracts the first download-button target from `html`, joined against `page_url`.
///
/// Rules are tried in order; within a rule, matches that do not join into an
/// absolute http(s) URL are skipped.
#[must_use]
pub(crate) fn extract_download_target(html: &str, page_url: &Url) -> Option<(String, ResolveMethod)> {
    EXTRACTION_RULES.iter().find_map(|rule| {
        extract_captures(html, rule.pattern)
            .find_map(|raw| absolutize_url(raw, page_url))
            .map(|target| (target, rule.method))
    })
}

/// Fetches a landing page and rewrites it to the link behind its download button.
///
/// Non-HTML responses are passed through unchanged since they are not
/// landing pages.
#[derive(Debug, Clone)]
pub struct LandingPageResolver {
    client: Client,
}

impl LandingPageResolver {
    /// Creates a resolver with its own HTTP client built from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the HTTP client cannot be constructed.
    pub fn new(settings: &HttpClientSettings) -> Result<Self, ResolveError> {
        let client = build_http_client("landing-page", settings)?;
        Ok(Self { client })
    }

    /// Creates a resolver around an existing client (shared cookie store, tests).
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resolver for LandingPageResolver {
    fn name(&self) -> &'static str {
        "landing-page"
    }

    fn priority(&self) -> ResolverPriority {
        ResolverPriority::General
    }

    fn can_handle(&self, input: &str) -> bool {
        is_http_url(input) && !is_direct_dl_path(input)
    }

    #[tracing::instrument(skip(self, ctx), fields(resolver = "landing-page"))]
    async fn resolve(
        &self,
        input: &str,
        ctx: &ResolveContext,
    ) -> Result<ResolveStep, ResolveError> {
        let response = match self
            .client
            .get(input)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .timeout(ctx.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                return Ok(ResolveStep::Failed(ResolveError::resolution_failed(
                    input,
                    &format!("resolver request error: {error}"),
                )));
            }
        };

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !content_type.contains("text/html") {
            debug!(content_type = %content_type, "Response is not HTML; passing through");
            return Ok(ResolveStep::Url(ResolvedUrl::new(
                input,
                ResolveMethod::NotLandingPage,
            )));
        }

        let page_url = response.url().clone();
        let Ok(html) = response.text().await else {
            return Ok(ResolveStep::Failed(ResolveError::resolution_failed(
                input,
                "landing page body could not be read",
            )));
        };

        match extract_download_target(&html, &page_url) {
            Some((target, method)) => Ok(ResolveStep::Url(ResolvedUrl::new(target, method))),
            None => Ok(ResolveStep::Failed(ResolveError::resolution_failed(
                input,
                "no download button marker in page",
            ))),
        }
    }
}

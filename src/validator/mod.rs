//! Link validation: HTTP probing plus the accept/reject predicates.
//!
//! A link passes when it answers 200/206, does not look like a landing page,
//! is recognised as a RAR archive and meets the minimum size. Every check can
//! be switched off through [`ValidationPolicy`]; rejections are per-link and
//! never abort a run.

mod detector;
mod probe;

pub use detector::{ContentTypeDetector, LandingPageDetector, looks_like_rar_target};
pub use probe::{ProbeError, ProbeResponse, content_range_total, parse_content_disposition};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::RANGE;
use thiserror::Error;
use tracing::{debug, warn};

use crate::input::is_absolute_url;
use crate::resolver::{HttpClientSettings, ResolveError, build_http_client};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Knobs for the validation predicates and probe retries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationPolicy {
    /// Minimum accepted size in bytes (0 disables the check).
    pub min_size_bytes: u64,
    /// Extra attempts after a transport failure.
    pub retry_count: u32,
    /// Base sleep between attempts, multiplied by the attempt number.
    pub retry_backoff: Duration,
    /// Re-probe with a one-byte ranged GET when HEAD reports no size.
    pub head_fallback_get: bool,
    /// Reject targets not recognised as RAR.
    pub require_rar_extension: bool,
    /// Reject responses that look like HTML pages.
    pub reject_html_content: bool,
}

impl ValidationPolicy {
    /// Converts a megabyte threshold into bytes; negative values clamp to 0.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn min_size_from_mb(min_size_mb: f64) -> u64 {
        (min_size_mb.max(0.0) * BYTES_PER_MB) as u64
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_size_bytes: Self::min_size_from_mb(5.0),
            retry_count: 2,
            retry_backoff: Duration::from_millis(1500),
            head_fallback_get: true,
            require_rar_extension: true,
            reject_html_content: true,
        }
    }
}

/// Why a link was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// No scheme or host.
    #[error("Invalid URL format")]
    InvalidUrl,
    /// Status other than 200/206.
    #[error("HTTP {0}")]
    HttpStatus(u16),
    /// Response looks like an HTML landing page.
    #[error("Landing page/HTML response detected (non-direct file URL)")]
    LandingPage,
    /// Not recognised as a RAR archive.
    #[error("Target is not recognized as RAR file")]
    NotRar,
    /// Reported size below the configured minimum.
    #[error("File too small: {size} bytes")]
    TooSmall {
        /// Reported size in bytes.
        size: u64,
    },
    /// Server did not report a size while a minimum is configured.
    #[error("File size unknown (server did not report a size)")]
    UnknownSize,
    /// Every attempt timed out.
    #[error("Timeout")]
    Timeout,
    /// Every attempt failed before a response arrived.
    #[error("Request error: {0}")]
    Request(String),
}

impl From<ProbeError> for Rejection {
    fn from(error: ProbeError) -> Self {
        match error {
            ProbeError::Timeout => Self::Timeout,
            ProbeError::Request(message) => Self::Request(message),
        }
    }
}

/// Outcome of validating one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// The URL that was probed.
    pub url: String,
    /// HTTP status, when a response arrived.
    pub status_code: Option<u16>,
    /// Reported size in bytes, 0 when unknown.
    pub size_bytes: u64,
    /// `None` when the link is accepted.
    pub rejection: Option<Rejection>,
}

impl ValidationResult {
    fn rejected(url: &str, status_code: Option<u16>, size_bytes: u64, rejection: Rejection) -> Self {
        Self {
            url: url.to_string(),
            status_code,
            size_bytes,
            rejection: Some(rejection),
        }
    }

    /// Returns true when every predicate passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.rejection.is_none()
    }

    /// Returns true for an otherwise good 200/206 answer that only lacks a size.
    ///
    /// Explicit-link modes queue these anyway; IDM works out the size itself.
    #[must_use]
    pub fn is_unknown_size_only(&self) -> bool {
        matches!(self.status_code, Some(200 | 206))
            && matches!(self.rejection, Some(Rejection::UnknownSize))
    }

    /// Rejection text, or `OK` when accepted.
    #[must_use]
    pub fn reason(&self) -> String {
        self.rejection
            .as_ref()
            .map_or_else(|| "OK".to_string(), ToString::to_string)
    }
}

/// Applies the validation predicates to a probe result.
///
/// Check order: status, landing page, RAR, size.
#[must_use]
pub fn evaluate(
    url: &str,
    probe: &ProbeResponse,
    policy: &ValidationPolicy,
    detector: &dyn LandingPageDetector,
) -> ValidationResult {
    let status = Some(probe.status);
    let size = probe.size_bytes;

    if !probe.is_ok_status() {
        return ValidationResult::rejected(url, status, size, Rejection::HttpStatus(probe.status));
    }
    if policy.reject_html_content && detector.looks_like_landing_page(probe) {
        return ValidationResult::rejected(url, status, size, Rejection::LandingPage);
    }
    if policy.require_rar_extension && !looks_like_rar_target(url, probe) {
        return ValidationResult::rejected(url, status, size, Rejection::NotRar);
    }
    if size < policy.min_size_bytes {
        let rejection = if size == 0 {
            Rejection::UnknownSize
        } else {
            Rejection::TooSmall { size }
        };
        return ValidationResult::rejected(url, status, size, rejection);
    }

    ValidationResult {
        url: url.to_string(),
        status_code: status,
        size_bytes: size,
        rejection: None,
    }
}

/// Validates a single link.
#[async_trait]
pub trait LinkValidator: Send + Sync {
    /// Probes `url` and applies the predicates.
    async fn validate(&self, url: &str) -> ValidationResult;
}

/// [`LinkValidator`] that probes over HTTP with HEAD and an optional ranged GET.
pub struct HttpLinkValidator {
    client: Client,
    policy: ValidationPolicy,
    detector: Box<dyn LandingPageDetector>,
}

impl HttpLinkValidator {
    /// Creates a validator with its own HTTP client and the default detector.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the HTTP client cannot be built.
    pub fn new(policy: ValidationPolicy, http: &HttpClientSettings) -> Result<Self, ResolveError> {
        Ok(Self {
            client: build_http_client("validator", http)?,
            policy,
            detector: Box::new(ContentTypeDetector),
        })
    }

    /// Replaces the landing-page detector.
    #[must_use]
    pub fn with_detector(mut self, detector: Box<dyn LandingPageDetector>) -> Self {
        self.detector = detector;
        self
    }

    async fn probe_once(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        let head = self.client.head(url).send().await?;
        let probe = ProbeResponse::from_response(&head);
        if !self.policy.head_fallback_get || probe.size_bytes > 0 {
            return Ok(probe);
        }

        debug!(url, "HEAD reported no size; probing with ranged GET");
        let get = self.client.get(url).header(RANGE, "bytes=0-0").send().await?;
        let mut fallback = ProbeResponse::from_response(&get);
        if fallback.size_bytes <= 1 {
            fallback.size_bytes = 0;
        }
        Ok(fallback)
    }
}

impl std::fmt::Debug for HttpLinkValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLinkValidator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LinkValidator for HttpLinkValidator {
    #[tracing::instrument(skip(self))]
    async fn validate(&self, url: &str) -> ValidationResult {
        if !is_absolute_url(url) {
            return ValidationResult::rejected(url, None, 0, Rejection::InvalidUrl);
        }

        let attempts = self.policy.retry_count.saturating_add(1);
        let mut attempt: u32 = 1;
        loop {
            match self.probe_once(url).await {
                Ok(probe) => return evaluate(url, &probe, &self.policy, self.detector.as_ref()),
                Err(error) if attempt >= attempts => {
                    return ValidationResult::rejected(url, None, 0, error.into());
                }
                Err(error) => {
                    warn!(attempt, attempts, error = %error, "Probe failed; retrying");
                    tokio::time::sleep(self.policy.retry_backoff.saturating_mul(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

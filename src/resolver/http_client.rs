//! Shared HTTP client construction policy.
//!
//! Landing-page resolution and link probing both go through this builder so
//! they agree on timeout, user-agent, compression, cookie and TLS behavior.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::user_agent;

use super::ResolveError;

/// Connect timeout cap; the overall request timeout comes from the config.
const MAX_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Network settings shared by every HTTP client the tool builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientSettings {
    /// Whole-request timeout (`request_timeout`).
    pub timeout: Duration,
    /// Verify TLS certificates (`verify_ssl`).
    pub verify_ssl: bool,
}

impl HttpClientSettings {
    /// Creates settings from a timeout in seconds and the TLS verification flag.
    #[must_use]
    pub fn new(timeout_secs: u64, verify_ssl: bool) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            verify_ssl,
        }
    }

    fn connect_timeout(&self) -> Duration {
        self.timeout
            .min(Duration::from_secs(MAX_CONNECT_TIMEOUT_SECS))
    }
}

/// Builds an HTTP client using the shared policy.
///
/// `component` is only used for logging and error messages.
///
/// # Errors
///
/// Returns [`ResolveError`] when client construction fails (e.g. TLS backend
/// initialization).
pub fn build_http_client(
    component: &str,
    settings: &HttpClientSettings,
) -> Result<Client, ResolveError> {
    if !settings.verify_ssl {
        warn!(
            component,
            "TLS certificate verification disabled (verify_ssl=false)"
        );
    }

    let client = Client::builder()
        .connect_timeout(settings.connect_timeout())
        .timeout(settings.timeout)
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
        .cookie_store(true)
        .danger_accept_invalid_certs(!settings.verify_ssl)
        .build()
        .map_err(|error| {
            ResolveError::resolution_failed(
                component,
                &format!("HTTP client construction failed: {error}"),
            )
        })?;

    debug!(
        component,
        timeout_secs = settings.timeout.as_secs(),
        "HTTP client ready"
    );
    Ok(client)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_new_uses_seconds() {
        let settings = HttpClientSettings::new(7, true);
        assert_eq!(settings.timeout, Duration::from_secs(7));
        assert!(settings.verify_ssl);
    }

    #[test]
    fn test_connect_timeout_capped_at_ten_seconds() {
        let settings = HttpClientSettings::new(60, true);
        assert_eq!(settings.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_connect_timeout_follows_short_request_timeout() {
        let settings = HttpClientSettings::new(3, true);
        assert_eq!(settings.connect_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_build_http_client_succeeds_with_and_without_tls_verification() {
        assert!(build_http_client("probe", &HttpClientSettings::new(5, true)).is_ok());
        assert!(build_http_client("probe", &HttpClientSettings::new(5, false)).is_ok());
    }
}

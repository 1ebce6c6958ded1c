//! Shared User-Agent string for probe and resolver HTTP clients.

/// Default User-Agent for all outbound HTTP requests (single shared format).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("idm-queue/{version} (link-checker)")
}

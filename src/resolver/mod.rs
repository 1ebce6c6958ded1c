//! Landing-page resolution for turning "download button" pages into direct links.
//!
//! Many file hosts put a landing page in front of the real file. This module
//! rewrites such links into direct download URLs through a priority-ordered
//! registry of resolvers with fallback support.
//!
//! # Architecture
//!
//! - [`Resolver`] - Async trait that individual resolvers implement
//! - [`ResolverRegistry`] - Priority-ordered collection of resolvers with resolution loop
//! - [`ResolveStep`] - Result enum from individual resolve operations
//! - [`DirectLinkResolver`] - Passthrough for links already on a `/dl/` path
//! - [`LandingPageResolver`] - Fetches the page and extracts the download button target
//! - [`BrowserClickResolver`] - Drives a WebDriver session and clicks the button
//!
//! # Example
//!
//! ```no_run
//! use idm_queue::resolver::{build_resolver_registry, HttpClientSettings, ResolveContext, ResolverSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ResolverSettings {
//!     http: HttpClientSettings::new(10, true),
//!     browser: None,
//! };
//! let registry = build_resolver_registry(&settings)?;
//! let ctx = ResolveContext::default();
//! let resolved = registry.resolve("https://host.example/file/abc", &ctx).await?;
//! println!("{} ({})", resolved.url, resolved.method);
//! # Ok(())
//! # }
//! ```

mod browser;
mod direct;
mod error;
mod http_client;
mod landing_page;
mod registry;
mod utils;

pub use browser::{BrowserClickResolver, BrowserSettings};
pub use direct::DirectLinkResolver;
pub use error::ResolveError;
pub use http_client::{HttpClientSettings, build_http_client};
pub use landing_page::LandingPageResolver;
pub use registry::ResolverRegistry;
pub use utils::{compile_static_regex, is_direct_dl_path, is_http_url};

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

/// Construction settings for the default resolver registry.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// HTTP policy for landing-page fetches.
    pub http: HttpClientSettings,
    /// Browser click fallback; `None` leaves it unregistered.
    pub browser: Option<BrowserSettings>,
}

/// Builds the resolver registry used by the queue pipeline.
///
/// Order is deterministic: already-direct passthrough, then HTML extraction,
/// then the browser click fallback when enabled.
///
/// # Errors
///
/// Returns [`ResolveError`] when the landing-page HTTP client cannot be built.
pub fn build_resolver_registry(settings: &ResolverSettings) -> Result<ResolverRegistry, ResolveError> {
    let mut registry = ResolverRegistry::new();
    registry.register(Box::new(DirectLinkResolver::new()));
    registry.register(Box::new(LandingPageResolver::new(&settings.http)?));
    if let Some(browser) = &settings.browser {
        registry.register(Box::new(BrowserClickResolver::new(browser.clone())));
    }
    Ok(registry)
}

/// Priority level for resolver ordering.
///
/// Resolvers are tried in priority order: Specialized first, then General, then Fallback.
/// Within the same priority level, resolvers are tried in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResolverPriority {
    /// Cheap checks that need no network (already-direct links)
    Specialized = 0,
    /// HTML fetch and marker extraction
    General = 1,
    /// Slow, heavyweight fallbacks (browser automation)
    Fallback = 2,
}

/// How a link ended up with its final URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMethod {
    /// Path already contains `/dl/`; passed through unchanged.
    AlreadyDirect,
    /// Response was not HTML; passed through unchanged.
    NotLandingPage,
    /// Extracted from an inline `window.open(...)` call.
    WindowOpen,
    /// Extracted from an `href` pointing at a `/dl/` path.
    HrefDl,
    /// Browser click opened a new window.
    BrowserNewWindow,
    /// Browser click navigated the current tab to a `/dl/` path.
    BrowserSameTab,
}

impl ResolveMethod {
    /// Returns true when the URL was rewritten (not a passthrough).
    #[must_use]
    pub fn is_rewrite(self) -> bool {
        !matches!(self, Self::AlreadyDirect | Self::NotLandingPage)
    }

    /// Human-readable reason used in per-link log lines.
    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            Self::AlreadyDirect => "already direct",
            Self::NotLandingPage => "not an HTML landing page",
            Self::WindowOpen => "resolved via window.open",
            Self::HrefDl => "resolved via href /dl/",
            Self::BrowserNewWindow => "resolved via browser click",
            Self::BrowserSameTab => "resolved via browser same-tab",
        }
    }
}

impl fmt::Display for ResolveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// A successfully resolved URL and how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    /// The final direct URL.
    pub url: String,
    /// Which path produced it.
    pub method: ResolveMethod,
}

impl ResolvedUrl {
    /// Creates a new resolved URL.
    #[must_use]
    pub fn new(url: impl Into<String>, method: ResolveMethod) -> Self {
        Self {
            url: url.into(),
            method,
        }
    }
}

/// Result of a single resolver's attempt to resolve input.
#[derive(Debug, Clone)]
pub enum ResolveStep {
    /// Final URL found (rewritten or passed through).
    Url(ResolvedUrl),
    /// This resolver could not find a target; the next one is tried.
    Failed(ResolveError),
}

/// Context passed to resolvers during resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext {
    /// Upper bound for one resolver's page fetch or browser wait.
    pub timeout: Duration,
}

impl ResolveContext {
    /// Creates a context with the given per-resolver timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

/// Trait that all resolvers must implement.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via `Box<dyn Resolver>`.
/// Rust 2024 native async traits are not object-safe, so `async_trait` is required
/// for the registry pattern.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Returns the resolver's name (e.g., "direct", "landing-page", "browser").
    fn name(&self) -> &str;

    /// Returns the resolver's priority level.
    fn priority(&self) -> ResolverPriority;

    /// Returns true if this resolver can handle the given link.
    fn can_handle(&self, input: &str) -> bool;

    /// Attempts to resolve the link into a direct URL.
    async fn resolve(&self, input: &str, ctx: &ResolveContext)
    -> Result<ResolveStep, ResolveError>;
}

//! Already-direct link resolver.
//!
//! Links whose path contains `/dl/` already point at the file; they pass
//! through unchanged without any network traffic.

use async_trait::async_trait;

use super::utils::{is_direct_dl_path, is_http_url};
use super::{
    ResolveContext, ResolveError, ResolveMethod, ResolveStep, ResolvedUrl, Resolver,
    ResolverPriority,
};

/// A resolver that passes `/dl/` links through unchanged.
#[derive(Debug)]
pub struct DirectLinkResolver;

impl DirectLinkResolver {
    /// Creates a new `DirectLinkResolver`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for DirectLinkResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resolver for DirectLinkResolver {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn priority(&self) -> ResolverPriority {
        ResolverPriority::Specialized
    }

    fn can_handle(&self, input: &str) -> bool {
        is_http_url(input) && is_direct_dl_path(input)
    }

    #[tracing::instrument(skip(self, _ctx), fields(resolver = "direct"))]
    async fn resolve(
        &self,
        input: &str,
        _ctx: &ResolveContext,
    ) -> Result<ResolveStep, ResolveError> {
        Ok(ResolveStep::Url(ResolvedUrl::new(
            input,
            ResolveMethod::AlreadyDirect,
        )))
    }
}

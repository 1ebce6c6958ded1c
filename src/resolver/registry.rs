//! Resolver registry with priority-ordered resolution loop.
//!
//! The [`ResolverRegistry`] manages a collection of resolvers and walks the
//! fallback chain until one of them produces a URL.

use tracing::{debug, info, warn};

use super::{ResolveContext, ResolveError, ResolveStep, ResolvedUrl, Resolver};

/// A priority-ordered collection of resolvers with resolution loop.
///
/// The registry tries resolvers in priority order (Specialized first, then General,
/// then Fallback). Within the same priority level, resolvers are tried in
/// registration order.
pub struct ResolverRegistry {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl ResolverRegistry {
    /// Creates an empty resolver registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Registers a resolver with the registry.
    #[tracing::instrument(skip(self, resolver), fields(resolver_name))]
    pub fn register(&mut self, resolver: Box<dyn Resolver>) {
        tracing::Span::current().record("resolver_name", resolver.name());
        debug!(
            name = resolver.name(),
            priority = ?resolver.priority(),
            "Registering resolver"
        );
        self.resolvers.push(resolver);
    }

    /// Returns the number of registered resolvers.
    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }

    /// Returns true if no resolvers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Returns all resolvers that can handle the given link, sorted by priority.
    #[must_use]
    pub fn find_handlers(&self, input: &str) -> Vec<&dyn Resolver> {
        let mut handlers: Vec<&dyn Resolver> = self
            .resolvers
            .iter()
            .filter(|r| r.can_handle(input))
            .map(AsRef::as_ref)
            .collect();
        handlers.sort_by_key(|r| r.priority());
        handlers
    }

    /// Resolves a link to a direct URL.
    ///
    /// Tries each applicable resolver in priority order and returns the first
    /// [`ResolveStep::Url`]. `Failed` steps and resolver errors are collected
    /// and the next resolver is tried.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::NoResolver` if no registered resolver can handle the link.
    /// Returns `ResolveError::AllResolversFailed` with every collected reason if all
    /// applicable resolvers fail.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn resolve(
        &self,
        input: &str,
        ctx: &ResolveContext,
    ) -> Result<ResolvedUrl, ResolveError> {
        let handlers = self.find_handlers(input);
        if handlers.is_empty() {
            return Err(ResolveError::no_resolver(input));
        }

        debug!(handler_count = handlers.len(), "Found handlers for link");

        let mut reasons = Vec::with_capacity(handlers.len());
        for handler in handlers {
            debug!(resolver = handler.name(), "Trying resolver");
            match handler.resolve(input, ctx).await {
                Ok(ResolveStep::Url(resolved)) => {
                    info!(
                        resolver = handler.name(),
                        url = %resolved.url,
                        method = %resolved.method,
                        "Resolution successful"
                    );
                    return Ok(resolved);
                }
                Ok(ResolveStep::Failed(err)) => {
                    debug!(
                        resolver = handler.name(),
                        error = %err.reason(),
                        "Resolver failed, trying next"
                    );
                    reasons.push(err.reason());
                }
                Err(err) => {
                    warn!(
                        resolver = handler.name(),
                        error = %err.reason(),
                        "Resolver returned error"
                    );
                    reasons.push(err.reason());
                }
            }
        }

        Err(ResolveError::all_failed(input, reasons))
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.resolvers.iter().map(|r| r.name()).collect();
        f.debug_struct("ResolverRegistry")
            .field("resolver_count", &self.resolvers.len())
            .field("resolvers", &names)
            .finish()
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resolver::{ResolveMethod, ResolverPriority};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockResolver {
        mock_name: &'static str,
        mock_priority: ResolverPriority,
        step: Result<ResolveStep, ResolveError>,
        calls: Arc<AtomicUsize>,
    }

    impl MockResolver {
        fn new(
            mock_name: &'static str,
            mock_priority: ResolverPriority,
            step: Result<ResolveStep, ResolveError>,
        ) -> Self {
            Self {
                mock_name,
                mock_priority,
                step,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Resolver for MockResolver {
        fn name(&self) -> &str {
            self.mock_name
        }

        fn priority(&self) -> ResolverPriority {
            self.mock_priority
        }

        fn can_handle(&self, input: &str) -> bool {
            input.starts_with("http")
        }

        async fn resolve(
            &self,
            _input: &str,
            _ctx: &ResolveContext,
        ) -> Result<ResolveStep, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.step.clone()
        }
    }

    fn url_step(url: &str, method: ResolveMethod) -> Result<ResolveStep, ResolveError> {
        Ok(ResolveStep::Url(ResolvedUrl::new(url, method)))
    }

    fn failed_step(reason: &str) -> Result<ResolveStep, ResolveError> {
        Ok(ResolveStep::Failed(ResolveError::resolution_failed("x", reason)))
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = ResolverRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.resolver_count(), 0);
    }

    #[test]
    fn test_find_handlers_sorted_by_priority() {
        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(MockResolver::new(
            "fallback",
            ResolverPriority::Fallback,
            failed_step("no"),
        )));
        registry.register(Box::new(MockResolver::new(
            "specialized",
            ResolverPriority::Specialized,
            failed_step("no"),
        )));
        registry.register(Box::new(MockResolver::new(
            "general",
            ResolverPriority::General,
            failed_step("no"),
        )));

        let names: Vec<&str> = registry
            .find_handlers("https://example.com")
            .iter()
            .map(|r| r.name())
            .collect();
        assert_eq!(names, vec!["specialized", "general", "fallback"]);
    }

    #[tokio::test]
    async fn test_resolve_no_handlers_returns_no_resolver() {
        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(MockResolver::new(
            "general",
            ResolverPriority::General,
            failed_step("no"),
        )));
        let err = registry
            .resolve("not-a-link", &ResolveContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoResolver { .. }));
    }

    #[tokio::test]
    async fn test_resolve_falls_back_after_failure() {
        let fallback = MockResolver::new(
            "browser",
            ResolverPriority::Fallback,
            url_step("https://example.com/dl/final", ResolveMethod::BrowserNewWindow),
        );
        let fallback_calls = Arc::clone(&fallback.calls);

        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(MockResolver::new(
            "landing-page",
            ResolverPriority::General,
            failed_step("no download button marker in page"),
        )));
        registry.register(Box::new(fallback));

        let resolved = registry
            .resolve("https://example.com/file/1", &ResolveContext::default())
            .await
            .unwrap();
        assert_eq!(resolved.url, "https://example.com/dl/final");
        assert_eq!(resolved.method, ResolveMethod::BrowserNewWindow);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolve_stops_at_first_success() {
        let fallback = MockResolver::new(
            "browser",
            ResolverPriority::Fallback,
            url_step("https://example.com/dl/other", ResolveMethod::BrowserSameTab),
        );
        let fallback_calls = Arc::clone(&fallback.calls);

        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(fallback));
        registry.register(Box::new(MockResolver::new(
            "landing-page",
            ResolverPriority::General,
            url_step("https://example.com/dl/first", ResolveMethod::WindowOpen),
        )));

        let resolved = registry
            .resolve("https://example.com/file/1", &ResolveContext::default())
            .await
            .unwrap();
        assert_eq!(resolved.url, "https://example.com/dl/first");
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_all_failed_collects_reasons_including_errors() {
        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(MockResolver::new(
            "landing-page",
            ResolverPriority::General,
            failed_step("no download button marker in page"),
        )));
        registry.register(Box::new(MockResolver::new(
            "browser",
            ResolverPriority::Fallback,
            Err(ResolveError::resolution_failed("x", "webdriver unreachable")),
        )));

        let err = registry
            .resolve("https://example.com/file/1", &ResolveContext::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.reason(),
            "download button link not found; no download button marker in page; webdriver unreachable"
        );
    }

    #[test]
    fn test_registry_debug_lists_names() {
        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(MockResolver::new(
            "direct",
            ResolverPriority::Specialized,
            failed_step("no"),
        )));
        let debug = format!("{registry:?}");
        assert!(debug.contains("direct"));
        assert!(debug.contains("resolver_count: 1"));
    }
}

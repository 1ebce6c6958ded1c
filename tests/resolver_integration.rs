//! Integration tests for the resolver module.
//!
//! Tests landing-page resolution through the public registry API against a
//! mock file host.

use idm_queue::resolver::{
    DirectLinkResolver, HttpClientSettings, LandingPageResolver, ResolveContext, ResolveError,
    ResolveMethod, ResolverRegistry, ResolverSettings, build_resolver_registry,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

fn registry() -> ResolverRegistry {
    build_resolver_registry(&ResolverSettings {
        http: HttpClientSettings::new(5, true),
        browser: None,
    })
    .unwrap()
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_resolver_registry_direct_link_needs_no_request() {
    let mut registry = ResolverRegistry::new();
    registry.register(Box::new(DirectLinkResolver::new()));

    let url = "https://host.example/dl/abc123#Game.part001.rar";
    let resolved = registry.resolve(url, &ResolveContext::default()).await.unwrap();

    assert_eq!(resolved.url, url, "URL should be preserved exactly");
    assert_eq!(resolved.method, ResolveMethod::AlreadyDirect);
    assert!(!resolved.method.is_rewrite());
}

#[tokio::test]
async fn test_resolver_registry_rejects_non_http_input() {
    let err = registry()
        .resolve("ftp://host.example/file", &ResolveContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::NoResolver { .. }));
}

#[tokio::test]
async fn test_landing_page_window_open_is_extracted() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/file/abc"))
        .respond_with(html(
            r#"<html><button onclick="window.open('/dl/abc?token=1')">Download</button></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = format!("{}/file/abc", mock_server.uri());
    let resolved = registry().resolve(&page, &ResolveContext::default()).await.unwrap();

    assert_eq!(resolved.url, format!("{}/dl/abc?token=1", mock_server.uri()));
    assert_eq!(resolved.method, ResolveMethod::WindowOpen);
    assert!(resolved.method.is_rewrite());
}

#[tokio::test]
async fn test_landing_page_href_dl_is_extracted() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/file/xyz"))
        .respond_with(html(
            r#"<a href="/about">About</a><a class="btn" href="https://cdn.example/dl/xyz">Get</a>"#,
        ))
        .mount(&mock_server)
        .await;

    let page = format!("{}/file/xyz", mock_server.uri());
    let resolved = registry().resolve(&page, &ResolveContext::default()).await.unwrap();

    assert_eq!(resolved.url, "https://cdn.example/dl/xyz");
    assert_eq!(resolved.method, ResolveMethod::HrefDl);
}

#[tokio::test]
async fn test_landing_page_non_html_passes_through() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/files/Game.part001.rar"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/octet-stream")
                .set_body_bytes(vec![0u8; 16]),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/files/Game.part001.rar", mock_server.uri());
    let resolved = registry().resolve(&url, &ResolveContext::default()).await.unwrap();

    assert_eq!(resolved.url, url);
    assert_eq!(resolved.method, ResolveMethod::NotLandingPage);
}

#[tokio::test]
async fn test_landing_page_without_marker_fails_with_reason() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/file/empty"))
        .respond_with(html("<html><p>Nothing to see</p></html>"))
        .mount(&mock_server)
        .await;

    let page = format!("{}/file/empty", mock_server.uri());
    let err = registry()
        .resolve(&page, &ResolveContext::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::AllResolversFailed { .. }));
    assert!(
        err.reason().contains("no download button marker"),
        "unexpected reason: {}",
        err.reason()
    );
}

#[tokio::test]
async fn test_landing_page_resolver_standalone_with_shared_client() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/file/shared"))
        .respond_with(html(r#"<script>window.open("/dl/shared")</script>"#))
        .mount(&mock_server)
        .await;

    let mut registry = ResolverRegistry::new();
    registry.register(Box::new(LandingPageResolver::with_client(reqwest::Client::new())));

    let page = format!("{}/file/shared", mock_server.uri());
    let resolved = registry.resolve(&page, &ResolveContext::default()).await.unwrap();
    assert_eq!(resolved.url, format!("{}/dl/shared", mock_server.uri()));
}

//! Browser click fallback for download buttons that only work with scripting.
//!
//! Talks WebDriver to a local `chromedriver` (started from `PATH` when no
//! endpoint is listening), loads the page, clicks the first `<button>` whose
//! text contains "download" and watches for a new window or a same-tab
//! navigation onto a `/dl/` path.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tokio::process::Child;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info};
use url::Url;

use super::utils::{is_direct_dl_path, is_http_url};
use super::{
    ResolveContext, ResolveError, ResolveMethod, ResolveStep, ResolvedUrl, Resolver,
    ResolverPriority,
};

/// Case-insensitive match on the button's normalized text.
const DOWNLOAD_BUTTON_XPATH: &str = "//button[contains(translate(normalize-space(.), 'download', 'DOWNLOAD'), 'DOWNLOAD')]";

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const DRIVER_START_ATTEMPTS: usize = 10;
const DRIVER_START_DELAY: Duration = Duration::from_millis(300);

/// WebDriver endpoint and browser mode for the click fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSettings {
    /// WebDriver endpoint, e.g. `http://localhost:9515`.
    pub webdriver_url: String,
    /// Run Chrome headless.
    pub headless: bool,
}

impl BrowserSettings {
    /// Creates browser settings.
    #[must_use]
    pub fn new(webdriver_url: impl Into<String>, headless: bool) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
        }
    }
}

/// Chrome capabilities for a new WebDriver session.
pub(crate) fn webdriver_capabilities(headless: bool) -> Capabilities {
    let mut args = vec!["--disable-gpu", "--no-sandbox", "--window-size=1400,1000"];
    if headless {
        args.insert(0, "--headless=new");
    }
    let mut caps = Capabilities::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

/// Port to pass to a locally spawned driver, only for loopback endpoints.
pub(crate) fn local_driver_port(webdriver_url: &str) -> Option<u16> {
    let parsed = Url::parse(webdriver_url).ok()?;
    let host = parsed.host_str()?;
    if !matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "::1") {
        return None;
    }
    parsed.port_or_known_default()
}

/// An open WebDriver session plus the driver process we started, if any.
struct BrowserSession {
    client: Client,
    _driver: Option<Child>,
}

/// Resolver that clicks the download button in a real browser.
#[derive(Debug, Clone)]
pub struct BrowserClickResolver {
    settings: BrowserSettings,
}

impl BrowserClickResolver {
    /// Creates the resolver; no session is opened until the first resolve.
    #[must_use]
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    async fn connect(&self) -> Result<Client, String> {
        ClientBuilder::native()
            .capabilities(webdriver_capabilities(self.settings.headless))
            .connect(&self.settings.webdriver_url)
            .await
            .map_err(|error| error.to_string())
    }

    async fn open_session(&self) -> Result<BrowserSession, String> {
        let first_error = match self.connect().await {
            Ok(client) => {
                return Ok(BrowserSession {
                    client,
                    _driver: None,
                });
            }
            Err(error) => error,
        };

        let Some(port) = local_driver_port(&self.settings.webdriver_url) else {
            return Err(first_error);
        };
        let Ok(driver_path) = which::which("chromedriver") else {
            return Err(format!("{first_error}; chromedriver not found on PATH"));
        };

        debug!(driver = %driver_path.display(), port, "Starting chromedriver");
        let driver = tokio::process::Command::new(&driver_path)
            .arg(format!("--port={port}"))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| format!("failed to start chromedriver: {error}"))?;

        for _ in 0..DRIVER_START_ATTEMPTS {
            sleep(DRIVER_START_DELAY).await;
            if let Ok(client) = self.connect().await {
                return Ok(BrowserSession {
                    client,
                    _driver: Some(driver),
                });
            }
        }
        Err("chromedriver started but did not accept a session".to_string())
    }
}

/// Loads the page, clicks the button and waits for the target URL.
async fn click_through(
    client: &Client,
    page_url: &str,
    wait: Duration,
) -> Result<Option<(String, ResolveMethod)>, String> {
    timeout(wait, client.goto(page_url))
        .await
        .map_err(|_| "page load timed out".to_string())?
        .map_err(|error| format!("page load failed: {error}"))?;

    let before = client
        .windows()
        .await
        .map_err(|error| error.to_string())?;

    let button = client
        .wait()
        .at_most(wait)
        .for_element(Locator::XPath(DOWNLOAD_BUTTON_XPATH))
        .await
        .map_err(|error| format!("download button not found: {error}"))?;
    button
        .click()
        .await
        .map_err(|error| format!("download button click failed: {error}"))?;

    let deadline = Instant::now() + wait;
    loop {
        let handles = client
            .windows()
            .await
            .map_err(|error| error.to_string())?;
        if let Some(handle) = handles.into_iter().find(|h| !before.contains(h)) {
            client
                .switch_to_window(handle)
                .await
                .map_err(|error| error.to_string())?;
            return wait_for_navigation(client, deadline).await;
        }

        let current = client
            .current_url()
            .await
            .map_err(|error| error.to_string())?;
        if is_direct_dl_path(current.as_str()) {
            return Ok(Some((current.to_string(), ResolveMethod::BrowserSameTab)));
        }

        if Instant::now() >= deadline {
            return Ok(None);
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Polls a freshly opened window until it leaves `about:blank`.
async fn wait_for_navigation(
    client: &Client,
    deadline: Instant,
) -> Result<Option<(String, ResolveMethod)>, String> {
    loop {
        let current = client
            .current_url()
            .await
            .map_err(|error| error.to_string())?;
        if is_http_url(current.as_str()) {
            return Ok(Some((current.to_string(), ResolveMethod::BrowserNewWindow)));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        sleep(POLL_INTERVAL).await;
    }
}

#[async_trait]
impl Resolver for BrowserClickResolver {
    fn name(&self) -> &'static str {
        "browser"
    }

    fn priority(&self) -> ResolverPriority {
        ResolverPriority::Fallback
    }

    fn can_handle(&self, input: &str) -> bool {
        is_http_url(input) && !is_direct_dl_path(input)
    }

    #[tracing::instrument(skip(self, ctx), fields(resolver = "browser"))]
    async fn resolve(
        &self,
        input: &str,
        ctx: &ResolveContext,
    ) -> Result<ResolveStep, ResolveError> {
        let session = match self.open_session().await {
            Ok(session) => session,
            Err(reason) => {
                return Ok(ResolveStep::Failed(ResolveError::resolution_failed(
                    input,
                    &format!("browser fallback unavailable: {reason}"),
                )));
            }
        };

        let outcome = click_through(&session.client, input, ctx.timeout).await;
        if let Err(error) = session.client.clone().close().await {
            debug!(error = %error, "Closing browser session failed");
        }

        match outcome {
            Ok(Some((url, method))) => {
                info!(url = %url, method = %method, "Browser click produced target");
                Ok(ResolveStep::Url(ResolvedUrl::new(url, method)))
            }
            Ok(None) => Ok(ResolveStep::Failed(ResolveError::resolution_failed(
                input,
                "browser click did not open a download link",
            ))),
            Err(reason) => Ok(ResolveStep::Failed(ResolveError::resolution_failed(
                input,
                &format!("browser fallback error: {reason}"),
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_headless_adds_flag() {
        let caps = webdriver_capabilities(true);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert_eq!(args[0], "--headless=new");
        assert_eq!(caps["browserName"], "chrome");
    }

    #[test]
    fn test_capabilities_headed_omits_flag() {
        let caps = webdriver_capabilities(false);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().all(|arg| arg != "--headless=new"));
    }

    #[test]
    fn test_local_driver_port_only_for_loopback() {
        assert_eq!(local_driver_port("http://localhost:9515"), Some(9515));
        assert_eq!(local_driver_port("http://127.0.0.1:4444/wd/hub"), Some(4444));
        assert_eq!(local_driver_port("http://grid.internal:4444"), None);
        assert_eq!(local_driver_port("not a url"), None);
    }

    #[test]
    fn test_browser_resolver_is_fallback_for_landing_pages() {
        let resolver =
            BrowserClickResolver::new(BrowserSettings::new("http://localhost:9515", true));
        assert_eq!(resolver.name(), "browser");
        assert_eq!(resolver.priority(), ResolverPriority::Fallback);
        assert!(resolver.can_handle("https://host.example/file/abc"));
        assert!(!resolver.can_handle("https://host.example/dl/abc"));
    }

    #[tokio::test]
    async fn test_browser_resolver_unreachable_endpoint_fails_softly() {
        let resolver =
            BrowserClickResolver::new(BrowserSettings::new("http://127.0.0.1:1/", true));
        let ctx = ResolveContext::new(Duration::from_secs(1));
        let step = timeout(
            Duration::from_secs(30),
            resolver.resolve("https://host.example/file/abc", &ctx),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(matches!(step, ResolveStep::Failed(_)));
    }
}

//! JSON configuration: loading, defaults, aliases and validation.
//!
//! The config is read once at startup into an immutable [`AppConfig`].
//! Relative paths resolve against the config file's directory. A missing
//! config file is replaced by a template and reported as
//! [`ConfigError::TemplateCreated`] so the caller can stop without treating
//! it as a failure.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use idm_queue::config::load_config;
//!
//! let config = load_config(Path::new("config.json"))?;
//! println!("mode: {}", config.input.mode);
//! # Ok::<(), idm_queue::config::ConfigError>(())
//! ```

mod error;
mod paths;
mod raw;
mod template;

pub use error::ConfigError;
pub use paths::{expand_env_vars, resolve_config_path};
pub use template::{default_template, write_template};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use crate::idm::detect_idm_path;
use crate::input::{
    InputMode, InputSources, MultipartPattern, SelectedInput, derive_pattern_from_source_url,
    select_input,
};
use crate::queue::ExistingFileAction;
use crate::resolver::{BrowserSettings, HttpClientSettings, ResolverSettings};
use crate::validator::ValidationPolicy;

use raw::{ListSplit, RawConfig};

/// Upper bound for `retry_backoff_seconds`.
const MAX_RETRY_BACKOFF_SECONDS: f64 = 3600.0;

/// Fully validated run configuration.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppConfig {
    /// Directory of the config file; relative paths were resolved against it.
    pub config_dir: PathBuf,
    /// Generated mode: base URL joined with each expanded pattern.
    pub base_url: String,
    /// Generated mode: pattern with `{index}` / `{index_raw}` / `{base_url}`.
    pub filename_pattern: String,
    /// First part number.
    pub start_index: u64,
    /// Last part number; `None` means probe until a part fails.
    pub end_index: Option<u64>,
    /// Probe for the last part when `end_index` is unset.
    pub auto_detect_parts: bool,
    /// Zero-padding width for `{index}`.
    pub padding: usize,
    /// Minimum accepted size in MiB.
    pub min_size_mb: f64,
    /// Upper bound on generated URLs examined.
    pub max_part: u64,
    /// IDM save directory.
    pub download_path: PathBuf,
    /// IDM executable, configured or auto-detected.
    pub idm_path: Option<PathBuf>,
    /// Shortcut used to launch IDM before starting the queue.
    pub idm_shortcut_path: PathBuf,
    /// Add to the queue without starting (`/a`).
    pub queue_only: bool,
    /// Start the IDM queue after enqueueing.
    pub auto_start_queue: bool,
    /// HTTP, browser and IDM call timeout in seconds.
    pub request_timeout_secs: u64,
    /// Probe retries after transport failures.
    pub retry_count: u32,
    /// Base backoff between probe retries.
    pub retry_backoff_seconds: f64,
    /// Ranged GET re-probe when HEAD reports no size.
    pub head_fallback_get: bool,
    /// Reject non-RAR targets.
    pub require_rar_extension: bool,
    /// Reject HTML responses.
    pub reject_html_content: bool,
    /// Rewrite landing pages into direct links.
    pub resolve_download_button_links: bool,
    /// Use a WebDriver browser when HTML extraction fails.
    pub selenium_fallback_enabled: bool,
    /// Run the browser headless.
    pub selenium_headless: bool,
    /// WebDriver endpoint.
    pub webdriver_url: String,
    /// Policy for targets already present in `download_path`.
    pub existing_file_action: ExistingFileAction,
    /// Skip URLs queued by earlier runs.
    pub resume_mode: bool,
    /// Resume state location.
    pub resume_state_file: PathBuf,
    /// Log what would be queued without calling IDM.
    pub dry_run: bool,
    /// Diagnostic log file.
    pub log_file: PathBuf,
    /// Rotation threshold for `log_file`.
    pub log_max_mb: u64,
    /// Launch IDM through `idm_shortcut_path` before `/s`.
    pub launch_idm_shortcut: bool,
    /// Verify TLS certificates.
    pub verify_ssl: bool,
    /// Drop resume entries IDM no longer knows about.
    pub validate_resume_with_idm: bool,
    /// IDM's download-list directory.
    pub idm_state_dir: PathBuf,
    /// The winning input source and its links.
    pub input: SelectedInput,
}

impl AppConfig {
    /// `min_size_mb` in bytes.
    #[must_use]
    pub fn min_size_bytes(&self) -> u64 {
        ValidationPolicy::min_size_from_mb(self.min_size_mb)
    }

    /// Generated-mode pattern.
    #[must_use]
    pub fn multipart_pattern(&self) -> MultipartPattern {
        MultipartPattern::new(&self.base_url, &self.filename_pattern, self.padding)
    }

    /// Validation knobs for the link validator.
    #[must_use]
    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            min_size_bytes: self.min_size_bytes(),
            retry_count: self.retry_count,
            retry_backoff: Duration::try_from_secs_f64(self.retry_backoff_seconds)
                .unwrap_or(Duration::ZERO),
            head_fallback_get: self.head_fallback_get,
            require_rar_extension: self.require_rar_extension,
            reject_html_content: self.reject_html_content,
        }
    }

    /// Shared HTTP client policy.
    #[must_use]
    pub fn http_settings(&self) -> HttpClientSettings {
        HttpClientSettings::new(self.request_timeout_secs, self.verify_ssl)
    }

    /// Resolver registry settings; the browser fallback only when enabled.
    #[must_use]
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            http: self.http_settings(),
            browser: self.selenium_fallback_enabled.then(|| {
                BrowserSettings::new(self.webdriver_url.clone(), self.selenium_headless)
            }),
        }
    }

    /// `request_timeout` as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Applies `--dry-run` / `--no-resume`.
    pub fn apply_cli_overrides(&mut self, dry_run: bool, no_resume: bool) {
        self.dry_run |= dry_run;
        self.resume_mode &= !no_resume;
    }
}

/// Loads configs; the IDM auto-detection hook is replaceable for tests.
#[derive(Debug, Clone, Copy)]
pub struct ConfigLoader {
    idm_detector: fn() -> Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            idm_detector: detect_idm_path,
        }
    }
}

impl ConfigLoader {
    /// Creates a loader with the standard IDM auto-detection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces IDM auto-detection used when `idm_path` is empty.
    #[must_use]
    pub fn with_idm_detector(mut self, detector: fn() -> Option<PathBuf>) -> Self {
        self.idm_detector = detector;
        self
    }

    /// Reads, parses and validates the config at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TemplateCreated`] after writing a template for a
    /// missing file, or any other [`ConfigError`] for unreadable, malformed or
    /// invalid configs.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> Result<AppConfig, ConfigError> {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

        if !path.exists() {
            write_template(&path)?;
            info!(path = %path.display(), "Config template created");
            return Err(ConfigError::TemplateCreated { path });
        }

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json {
            return Err(ConfigError::UnsupportedFormat { path });
        }

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let value: Value = serde_json::from_str(text.trim_start_matches('\u{feff}')).map_err(|err| {
            let message = err.to_string();
            let message = message
                .split(" at line ")
                .next()
                .unwrap_or_default()
                .to_string();
            ConfigError::InvalidJson {
                path: path.clone(),
                line: err.line(),
                column: err.column(),
                message,
            }
        })?;
        let Value::Object(values) = value else {
            return Err(ConfigError::NotAnObject { path });
        };

        let config_dir = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let config = build_config(&RawConfig::new(values), config_dir, self.idm_detector)?;
        debug!(
            mode = %config.input.mode,
            links = config.input.urls.len(),
            "Config loaded"
        );
        Ok(config)
    }
}

/// Loads `path` with the standard IDM auto-detection.
///
/// # Errors
///
/// See [`ConfigLoader::load`].
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    ConfigLoader::new().load(path)
}

fn non_negative(field: &'static str, value: i64) -> Result<u64, ConfigError> {
    u64::try_from(value).map_err(|_| ConfigError::invalid_value(field, format!("{field} must be >= 0")))
}

fn at_least_one(field: &'static str, value: i64) -> Result<u64, ConfigError> {
    u64::try_from(value)
        .ok()
        .filter(|v| *v >= 1)
        .ok_or_else(|| ConfigError::invalid_value(field, format!("{field} must be >= 1")))
}

/// Base URL implied by `source_url`: everything before the last path segment.
fn base_from_source_url(source_url: &str) -> String {
    let without_query = source_url.split(['?', '#']).next().unwrap_or_default();
    match without_query.rsplit_once('/') {
        Some((base, _)) if base.contains("://") && !base.ends_with(':') && !base.ends_with('/') => {
            base.to_string()
        }
        _ => without_query.to_string(),
    }
}

#[allow(clippy::too_many_lines)]
fn build_config(
    raw: &RawConfig,
    config_dir: PathBuf,
    idm_detector: fn() -> Option<PathBuf>,
) -> Result<AppConfig, ConfigError> {
    let source_url = raw.string(&["source_url"], "")?;
    let (default_base, default_pattern) = if source_url.is_empty() {
        ("https://example.com".to_string(), "{index}".to_string())
    } else {
        (
            base_from_source_url(&source_url),
            derive_pattern_from_source_url(&source_url),
        )
    };
    let base_url = raw.string(&["base_url"], &default_base)?;
    let base_url = if base_url.is_empty() { default_base } else { base_url };
    let filename_pattern = raw.string(&["filename_pattern", "pattern"], &default_pattern)?;
    let filename_pattern = if filename_pattern.is_empty() {
        default_pattern
    } else {
        filename_pattern
    };

    let start_index = non_negative("start_index", raw.integer(&["start_index"], 1)?)?;
    let end_index = match raw.optional_integer(&["end_index"])? {
        None => None,
        Some(end) => {
            let end = non_negative("end_index", end)?;
            if end < start_index {
                return Err(ConfigError::invalid_value(
                    "end_index",
                    "end_index must be >= start_index",
                ));
            }
            Some(end)
        }
    };
    let auto_detect_parts = raw.bool(&["auto_detect_parts", "auto_detect"], true)?;
    if end_index.is_none() && !auto_detect_parts {
        return Err(ConfigError::invalid_value(
            "end_index",
            "end_index is null and auto_detect_parts is false; set an end_index or enable auto_detect_parts",
        ));
    }

    let padding = usize::try_from(at_least_one("padding", raw.integer(&["padding"], 3)?)?)
        .map_err(|_| ConfigError::invalid_value("padding", "padding is too large"))?;
    let min_size_mb = raw.float(&["min_size_mb"], 5.0)?;
    if min_size_mb < 0.0 {
        return Err(ConfigError::invalid_value("min_size_mb", "min_size_mb must be >= 0"));
    }
    let max_part = at_least_one("max_part", raw.integer(&["max_part"], 200)?)?;
    let request_timeout_secs = at_least_one("request_timeout", raw.integer(&["request_timeout"], 10)?)?;
    let retry_count = u32::try_from(non_negative("retry_count", raw.integer(&["retry_count"], 2)?)?)
        .map_err(|_| ConfigError::invalid_value("retry_count", "retry_count is too large"))?;
    let retry_backoff_seconds = raw.float(&["retry_backoff_seconds"], 1.5)?;
    if retry_backoff_seconds < 0.0 {
        return Err(ConfigError::invalid_value(
            "retry_backoff_seconds",
            "retry_backoff_seconds must be >= 0",
        ));
    }
    if retry_backoff_seconds > MAX_RETRY_BACKOFF_SECONDS {
        return Err(ConfigError::invalid_value(
            "retry_backoff_seconds",
            format!("retry_backoff_seconds must be <= {MAX_RETRY_BACKOFF_SECONDS}"),
        ));
    }
    let log_max_mb = at_least_one("log_max_mb", raw.integer(&["log_max_mb"], 10)?)?;

    let existing_file_action = raw
        .string(&["existing_file_action"], "ask")?
        .parse::<ExistingFileAction>()
        .map_err(|_| {
            ConfigError::invalid_value(
                "existing_file_action",
                "existing_file_action must be one of: ask, skip, overwrite",
            )
        })?;

    let path_value = |keys: &[&str], default: &str| -> Result<PathBuf, ConfigError> {
        let value = raw.string(keys, default)?;
        let value = if value.is_empty() { default.to_string() } else { value };
        Ok(resolve_config_path(&config_dir, &value))
    };

    let download_path = path_value(&["download_path"], "./downloads")?;
    let idm_shortcut_path = path_value(&["idm_shortcut_path"], "./IDMan.exe.lnk")?;
    let resume_state_file = path_value(&["resume_state_file"], "./resume_state.json")?;
    let log_file = path_value(&["log_file"], "./log.txt")?;
    let idm_state_dir = path_value(&["idm_state_dir"], "%APPDATA%/IDM/DwnlData")?;
    let idm_path_raw = raw.string(&["idm_path"], "")?;
    let idm_path = if idm_path_raw.is_empty() {
        idm_detector()
    } else {
        Some(resolve_config_path(&config_dir, &idm_path_raw))
    };

    let sources = InputSources {
        paste: raw.list(&["paste_input", "paste"], ListSplit::Tokens)?,
        urls: raw.list(&["input_urls", "paste_urls", "urls"], ListSplit::Lines)?,
        ids: raw.list(&["input_ids"], ListSplit::Lines)?,
        id_url_template: raw.string(&["id_url_template"], "")?,
    };
    let input = select_input(&sources)?;
    if input.mode == InputMode::Generated {
        MultipartPattern::new(&base_url, &filename_pattern, padding).validate()?;
    }

    Ok(AppConfig {
        base_url,
        filename_pattern,
        start_index,
        end_index,
        auto_detect_parts,
        padding,
        min_size_mb,
        max_part,
        download_path,
        idm_path,
        idm_shortcut_path,
        queue_only: raw.bool(&["queue_only"], true)?,
        auto_start_queue: raw.bool(&["auto_start_queue"], true)?,
        request_timeout_secs,
        retry_count,
        retry_backoff_seconds,
        head_fallback_get: raw.bool(&["head_fallback_get"], true)?,
        require_rar_extension: raw.bool(&["require_rar_extension"], true)?,
        reject_html_content: raw.bool(&["reject_html_content"], true)?,
        resolve_download_button_links: raw.bool(&["resolve_download_button_links"], true)?,
        selenium_fallback_enabled: raw.bool(&["selenium_fallback_enabled"], false)?,
        selenium_headless: raw.bool(&["selenium_headless"], true)?,
        webdriver_url: raw.string(&["webdriver_url"], "http://localhost:9515")?,
        existing_file_action,
        resume_mode: raw.bool(&["resume_mode"], true)?,
        resume_state_file,
        dry_run: raw.bool(&["dry_run"], false)?,
        log_file,
        log_max_mb,
        launch_idm_shortcut: raw.bool(&["launch_idm_shortcut"], true)?,
        verify_ssl: raw.bool(&["verify_ssl"], true)?,
        validate_resume_with_idm: raw.bool(&["validate_resume_with_idm"], true)?,
        idm_state_dir,
        input,
        config_dir,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::input::InputError;
    use serde_json::json;
    use tempfile::TempDir;

    fn no_idm() -> Option<PathBuf> {
        None
    }

    fn load_json(value: &Value) -> (TempDir, Result<AppConfig, ConfigError>) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
        let result = ConfigLoader::new().with_idm_detector(no_idm).load(&path);
        (dir, result)
    }

    #[test]
    fn test_load_missing_file_creates_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("config.json");
        let err = ConfigLoader::new()
            .with_idm_detector(no_idm)
            .load(&path)
            .unwrap_err();
        assert!(err.is_template_created());
        assert!(path.exists());

        let config = ConfigLoader::new().with_idm_detector(no_idm).load(&path).unwrap();
        assert_eq!(config.input.mode, InputMode::Generated);
        assert_eq!(config.existing_file_action, ExistingFileAction::Ask);
        assert_eq!(config.max_part, 200);
        assert_eq!(
            config.multipart_pattern().build_url(1),
            "https://example.com/downloads/archive.part001.rar"
        );
    }

    #[test]
    fn test_load_defaults_and_relative_paths() {
        let (dir, result) = load_json(&json!({}));
        let config = result.unwrap();
        assert_eq!(config.start_index, 1);
        assert_eq!(config.end_index, None);
        assert_eq!(config.padding, 3);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.retry_count, 2);
        assert!(config.queue_only);
        assert!(!config.selenium_fallback_enabled);
        assert!(config.idm_path.is_none());
        assert_eq!(config.min_size_bytes(), 5 * 1024 * 1024);
        let base = std::path::absolute(dir.path()).unwrap();
        assert_eq!(config.download_path, base.join("downloads"));
        assert_eq!(config.resume_state_file, base.join("resume_state.json"));
    }

    #[test]
    fn test_load_rejects_non_json_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "a: 1").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_load_reports_json_position() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{\n  \"a\": 1,\n  oops\n}").unwrap();
        let err = ConfigLoader::new().with_idm_detector(no_idm).load(&path).unwrap_err();
        match err {
            ConfigError::InvalidJson { line, column, ref message, .. } => {
                assert_eq!(line, 3);
                assert!(column > 0);
                assert!(!message.contains(" at line "));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_rejects_top_level_array() {
        let (_dir, result) = load_json(&json!([1, 2]));
        assert!(matches!(result, Err(ConfigError::NotAnObject { .. })));
    }

    #[test]
    fn test_validation_rules() {
        for (value, needle) in [
            (json!({"start_index": -1}), "start_index must be >= 0"),
            (json!({"start_index": 5, "end_index": 4}), "end_index must be >= start_index"),
            (json!({"padding": 0}), "padding must be >= 1"),
            (json!({"max_part": 0}), "max_part must be >= 1"),
            (json!({"request_timeout": 0}), "request_timeout must be >= 1"),
            (json!({"min_size_mb": -0.5}), "min_size_mb must be >= 0"),
            (json!({"retry_count": -1}), "retry_count must be >= 0"),
            (json!({"retry_backoff_seconds": -1}), "retry_backoff_seconds must be >= 0"),
            (json!({"retry_backoff_seconds": 1e300}), "retry_backoff_seconds must be <="),
            (json!({"log_max_mb": 0}), "log_max_mb must be >= 1"),
            (json!({"auto_detect_parts": false}), "auto_detect_parts is false"),
            (json!({"existing_file_action": "maybe"}), "ask, skip, overwrite"),
        ] {
            let (_dir, result) = load_json(&value);
            let err = result.unwrap_err();
            assert!(
                err.to_string().contains(needle),
                "{value} -> {err} (expected {needle})"
            );
        }
    }

    #[test]
    fn test_retry_backoff_builds_policy() {
        let (_dir, result) = load_json(&json!({"retry_backoff_seconds": 3600}));
        let policy = result.unwrap().validation_policy();
        assert_eq!(policy.retry_backoff, Duration::from_secs(3600));
    }

    #[test]
    fn test_aliases_and_lenient_bools() {
        let (_dir, result) = load_json(&json!({
            "pattern": "Game.part{index}.rar",
            "auto_detect": "no",
            "end_index": 4,
            "urls": "https://a.example/x.rar\n\nhttps://a.example/y.rar",
            "queue_only": "off",
        }));
        let config = result.unwrap();
        assert_eq!(config.filename_pattern, "Game.part{index}.rar");
        assert!(!config.auto_detect_parts);
        assert!(!config.queue_only);
        assert_eq!(config.input.mode, InputMode::Urls);
        assert_eq!(config.input.urls.len(), 2);
    }

    #[test]
    fn test_source_url_supplies_generated_defaults() {
        let (_dir, result) = load_json(&json!({
            "source_url": "https://h.example/files/Game.part01.rar",
        }));
        let config = result.unwrap();
        assert_eq!(config.base_url, "https://h.example/files");
        assert_eq!(
            config.filename_pattern,
            "https://h.example/files/Game.part{index}.rar"
        );
        assert_eq!(
            config.multipart_pattern().build_url(2),
            "https://h.example/files/Game.part002.rar"
        );
    }

    #[test]
    fn test_paste_wins_over_urls() {
        let (_dir, result) = load_json(&json!({
            "paste_input": "https://a.example/p1.rar abc",
            "input_urls": ["https://a.example/u1.rar"],
            "id_url_template": "https://a.example/file/{id}",
        }));
        let config = result.unwrap();
        assert_eq!(config.input.mode, InputMode::Paste);
        assert_eq!(
            config.input.urls,
            vec!["https://a.example/p1.rar", "https://a.example/file/abc"]
        );
    }

    #[test]
    fn test_ids_require_template() {
        let (_dir, result) = load_json(&json!({"input_ids": ["abc"]}));
        assert!(matches!(
            result,
            Err(ConfigError::Input(InputError::MissingIdTemplate { .. }))
        ));
    }

    #[test]
    fn test_generated_mode_validates_pattern() {
        let (_dir, result) = load_json(&json!({"base_url": "h.example", "filename_pattern": "p{index}"}));
        assert!(matches!(
            result,
            Err(ConfigError::Input(InputError::InvalidBaseUrl { .. }))
        ));
        let (_dir, result) = load_json(&json!({"filename_pattern": "p.rar"}));
        assert!(matches!(
            result,
            Err(ConfigError::Input(InputError::MissingIndexPlaceholder { .. }))
        ));
    }

    #[test]
    fn test_explicit_idm_path_resolved_relative() {
        let (dir, result) = load_json(&json!({"idm_path": "tools/IDMan.exe"}));
        let config = result.unwrap();
        assert_eq!(
            config.idm_path,
            Some(std::path::absolute(dir.path()).unwrap().join("tools").join("IDMan.exe"))
        );
    }

    #[test]
    fn test_apply_cli_overrides() {
        let (_dir, result) = load_json(&json!({"dry_run": false, "resume_mode": true}));
        let mut config = result.unwrap();
        config.apply_cli_overrides(true, true);
        assert!(config.dry_run);
        assert!(!config.resume_mode);

        let (_dir, result) = load_json(&json!({"dry_run": true}));
        let mut config = result.unwrap();
        config.apply_cli_overrides(false, false);
        assert!(config.dry_run);
        assert!(config.resume_mode);
    }

    #[test]
    fn test_resolver_settings_browser_only_when_enabled() {
        let (_dir, result) = load_json(&json!({"selenium_fallback_enabled": true, "selenium_headless": false}));
        let config = result.unwrap();
        let settings = config.resolver_settings();
        let browser = settings.browser.unwrap();
        assert!(!browser.headless);
        assert_eq!(browser.webdriver_url, "http://localhost:9515");

        let (_dir, result) = load_json(&json!({}));
        assert!(result.unwrap().resolver_settings().browser.is_none());
    }
}

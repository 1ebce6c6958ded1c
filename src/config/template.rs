//! Default config written when the configured file does not exist.

use std::fs;
use std::path::Path;

use serde_json::{Value, json};

use super::ConfigError;

/// The template document with every supported key at its default.
#[must_use]
pub fn default_template() -> Value {
    json!({
        "base_url": "https://example.com/downloads",
        "filename_pattern": "archive.part{index}.rar",
        "source_url": "",
        "start_index": 1,
        "end_index": null,
        "auto_detect_parts": true,
        "padding": 3,
        "min_size_mb": 5,
        "max_part": 200,
        "download_path": "./downloads",
        "idm_path": "",
        "idm_shortcut_path": "./IDMan.exe.lnk",
        "queue_only": true,
        "auto_start_queue": true,
        "request_timeout": 10,
        "retry_count": 2,
        "retry_backoff_seconds": 1.5,
        "head_fallback_get": true,
        "require_rar_extension": true,
        "reject_html_content": true,
        "resolve_download_button_links": true,
        "selenium_fallback_enabled": false,
        "selenium_headless": true,
        "webdriver_url": "http://localhost:9515",
        "existing_file_action": "ask",
        "resume_mode": true,
        "resume_state_file": "./resume_state.json",
        "dry_run": false,
        "log_file": "./log.txt",
        "log_max_mb": 10,
        "launch_idm_shortcut": true,
        "verify_ssl": true,
        "validate_resume_with_idm": true,
        "idm_state_dir": "%APPDATA%/IDM/DwnlData",
        "paste_input": [],
        "input_urls": [],
        "input_ids": [],
        "id_url_template": "https://example.com/{id}"
    })
}

/// Writes the template to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`ConfigError::TemplateWrite`] if the directory or file cannot be written.
pub fn write_template(path: &Path) -> Result<(), ConfigError> {
    let to_error = |source| ConfigError::TemplateWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    let mut body = serde_json::to_string_pretty(&default_template())
        .map_err(|err| to_error(std::io::Error::other(err)))?;
    body.push('\n');
    fs::write(path, body).map_err(to_error)
}

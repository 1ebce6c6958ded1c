//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use std::path::Path;

use serde_json::{Map, Value, json};

/// Writes a config next to `dir` with every side-effect path kept inside it.
///
/// `overrides` are merged over a quiet, fast baseline (no retries, no IDM
/// shortcut, no resolution).
pub fn write_config(dir: &Path, overrides: &Value) -> std::path::PathBuf {
    let mut config = json!({
        "download_path": dir.join("downloads"),
        "resume_state_file": dir.join("resume_state.json"),
        "log_file": dir.join("log.txt"),
        "idm_state_dir": dir.join("idm_state"),
        "idm_shortcut_path": dir.join("IDMan.exe.lnk"),
        "existing_file_action": "skip",
        "request_timeout": 5,
        "retry_count": 0,
        "retry_backoff_seconds": 0,
        "resolve_download_button_links": false,
        "launch_idm_shortcut": false,
        "validate_resume_with_idm": false,
        "min_size_mb": 1
    });
    if let (Some(base), Some(extra)) = (config.as_object_mut(), overrides.as_object()) {
        merge(base, extra);
    }

    let path = dir.join("config.json");
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

fn merge(base: &mut Map<String, Value>, extra: &Map<String, Value>) {
    for (key, value) in extra {
        base.insert(key.clone(), value.clone());
    }
}

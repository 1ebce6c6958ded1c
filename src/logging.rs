//! Tracing setup: console on stderr plus an append-only log file.
//!
//! The log file is rotated once at startup when it exceeds `log_max_mb`
//! (`log.txt` → `log.txt.1` → ... → `log.txt.3`).

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Rotated copies kept next to the active log file.
pub const LOG_BACKUPS: usize = 3;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Console level from `-v` / `-q`: quiet wins, then verbosity.
#[must_use]
pub fn console_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// This crate at `level`, dependencies at `warn`.
#[must_use]
pub fn filter_directive(level: &str) -> String {
    format!("warn,idm_queue={level}")
}

fn backup_path(path: &Path, generation: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{generation}"));
    PathBuf::from(name)
}

/// Shifts `path` into numbered backups when it is larger than `max_bytes`.
///
/// # Errors
///
/// Returns an error when a backup cannot be removed or renamed.
pub fn rotate_if_needed(path: &Path, max_bytes: u64, backups: usize) -> Result<bool> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(_) => return Ok(false),
    };
    if size <= max_bytes {
        return Ok(false);
    }
    if backups == 0 {
        fs::remove_file(path).with_context(|| format!("failed to truncate {}", path.display()))?;
        return Ok(true);
    }

    let oldest = backup_path(path, backups);
    if oldest.exists() {
        fs::remove_file(&oldest).with_context(|| format!("failed to remove {}", oldest.display()))?;
    }
    for generation in (1..backups).rev() {
        let from = backup_path(path, generation);
        if from.exists() {
            let to = backup_path(path, generation + 1);
            fs::rename(&from, &to).with_context(|| format!("failed to rotate {}", from.display()))?;
        }
    }
    let first = backup_path(path, 1);
    fs::rename(path, &first).with_context(|| format!("failed to rotate {}", path.display()))?;
    Ok(true)
}

/// Where and how loudly to log.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Console level when `RUST_LOG` is unset.
    pub console_level: &'static str,
    /// Log file; `None` logs to the console only.
    pub log_file: Option<PathBuf>,
    /// Rotation threshold in MiB.
    pub log_max_mb: u64,
}

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides the console level. The file always records at least
/// `info` so per-link outcomes survive a quiet console.
///
/// # Errors
///
/// Returns an error when the log file cannot be rotated or opened, or a
/// subscriber is already installed.
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(settings.console_level)));
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let file_layer = match &settings.log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create log directory {}", parent.display()))?;
            }
            rotate_if_needed(path, settings.log_max_mb.saturating_mul(BYTES_PER_MB), LOG_BACKUPS)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let file_level = match settings.console_level {
                "debug" | "trace" => settings.console_level,
                _ => "info",
            };
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(EnvFilter::new(filter_directive(file_level))),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

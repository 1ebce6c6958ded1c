//! Internet Download Manager integration.
//!
//! Everything IDM-specific lives here: locating the executable, building the
//! `/d ... /p ... /f ... /n [/a]` and `/s` command lines, running them with a
//! timeout, and cross-checking the resume set against IDM's download list.
//! The queue loop only sees the [`DownloadManager`] trait.

mod error;
mod locate;
mod state;

pub use error::IdmError;
pub use locate::{DEFAULT_INSTALL_PATHS, detect_idm_path};
pub use state::{read_idm_state_text, reconcile_with_idm_state};

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::report::FilePart;

/// `CREATE_NO_WINDOW`
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Something that can accept queued downloads.
#[async_trait]
pub trait DownloadManager: Send + Sync {
    /// Checks that the manager can be invoked at all.
    ///
    /// # Errors
    ///
    /// Returns an [`IdmError`] when the executable (or a required shortcut) is missing.
    fn ensure_available(&self) -> Result<(), IdmError> {
        Ok(())
    }

    /// Adds one part to the manager's queue.
    async fn queue_download(&self, part: &FilePart) -> Result<(), IdmError>;

    /// Starts processing the queue.
    async fn start_queue(&self) -> Result<(), IdmError>;

    /// Launches the manager's UI before starting the queue.
    async fn launch_via_shortcut(&self) -> Result<(), IdmError>;
}

/// Arguments for adding one download: `/d url /p dir /f name /n [/a]`.
#[must_use]
pub fn queue_args(part: &FilePart, download_path: &Path, queue_only: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "/d".into(),
        part.url.clone().into(),
        "/p".into(),
        download_path.as_os_str().to_owned(),
        "/f".into(),
        part.filename.clone().into(),
        "/n".into(),
    ];
    if queue_only {
        args.push("/a".into());
    }
    args
}

/// Arguments for starting the queue.
#[must_use]
pub fn start_args() -> Vec<OsString> {
    vec!["/s".into()]
}

fn display_command(program: &Path, args: &[OsString]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|part| {
            let text = part.to_string_lossy();
            if text.contains(' ') {
                format!("\"{text}\"")
            } else {
                text.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drives `IDMan.exe` through its command-line switches.
#[derive(Debug, Clone)]
pub struct IdmController {
    idm_path: Option<PathBuf>,
    download_path: PathBuf,
    queue_only: bool,
    timeout: Duration,
    shortcut_path: PathBuf,
    launch_shortcut: bool,
}

impl IdmController {
    /// Creates a controller.
    #[must_use]
    pub fn new(idm_path: Option<PathBuf>, download_path: PathBuf, queue_only: bool, timeout: Duration) -> Self {
        Self {
            idm_path,
            download_path,
            queue_only,
            timeout,
            shortcut_path: PathBuf::new(),
            launch_shortcut: false,
        }
    }

    /// Enables launching through a shortcut before `/s`.
    #[must_use]
    pub fn with_shortcut(mut self, shortcut_path: PathBuf) -> Self {
        self.shortcut_path = shortcut_path;
        self.launch_shortcut = true;
        self
    }

    /// Builds a controller from the run configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let controller = Self::new(
            config.idm_path.clone(),
            config.download_path.clone(),
            config.queue_only,
            config.request_timeout(),
        );
        if config.launch_idm_shortcut {
            controller.with_shortcut(config.idm_shortcut_path.clone())
        } else {
            controller
        }
    }

    fn executable(&self) -> Result<&Path, IdmError> {
        let path = self.idm_path.as_deref().ok_or(IdmError::NotConfigured)?;
        if !path.is_file() {
            return Err(IdmError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(path)
    }

    #[tracing::instrument(skip(self, program, args))]
    async fn run(&self, action: &'static str, program: &Path, args: Vec<OsString>) -> Result<(), IdmError> {
        let cmd = display_command(program, &args);
        let mut command = Command::new(program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let child = command
            .spawn()
            .map_err(|source| IdmError::Spawn { action, source })?;
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                warn!(cmd = %cmd, "[IDM][{action}] timed out");
                IdmError::Timeout {
                    action,
                    timeout: self.timeout,
                }
            })?
            .map_err(|source| IdmError::Spawn { action, source })?;

        let code = output.status.code();
        info!(rc = ?code, cmd = %cmd, "[IDM][{action}]");
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            debug!(stdout = %stdout.trim(), "[IDM][{action}] stdout");
        }
        if !stderr.trim().is_empty() {
            warn!(stderr = %stderr.trim(), "[IDM][{action}] stderr");
        }

        if output.status.success() {
            Ok(())
        } else {
            Err(IdmError::NonZeroExit { action, code })
        }
    }
}

#[async_trait]
impl DownloadManager for IdmController {
    fn ensure_available(&self) -> Result<(), IdmError> {
        self.executable()?;
        if self.launch_shortcut && !self.shortcut_path.is_file() {
            return Err(IdmError::ShortcutNotFound {
                path: self.shortcut_path.clone(),
            });
        }
        Ok(())
    }

    async fn queue_download(&self, part: &FilePart) -> Result<(), IdmError> {
        let program = self.executable()?;
        self.run("queue", program, queue_args(part, &self.download_path, self.queue_only))
            .await
    }

    async fn start_queue(&self) -> Result<(), IdmError> {
        let program = self.executable()?;
        self.run("start", program, start_args()).await
    }

    async fn launch_via_shortcut(&self) -> Result<(), IdmError> {
        if !self.shortcut_path.is_file() {
            return Err(IdmError::ShortcutNotFound {
                path: self.shortcut_path.clone(),
            });
        }
        if cfg!(windows) {
            let args = vec![
                OsString::from("/C"),
                OsString::from("start"),
                OsString::from(""),
                self.shortcut_path.as_os_str().to_owned(),
            ];
            self.run("shortcut", Path::new("cmd"), args).await
        } else {
            warn!(
                shortcut = %self.shortcut_path.display(),
                "Shortcut launch is only supported on Windows; skipping"
            );
            Ok(())
        }
    }
}

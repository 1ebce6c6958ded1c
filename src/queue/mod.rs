//! The per-link enqueue loop.
//!
//! For each validated part, in order:
//!
//! 1. skip URLs already seen in this run (`[SKIP][DUPLICATE]`)
//! 2. skip URLs recorded by earlier runs when resume is on (`[SKIP][RESUME]`)
//! 3. apply the existing-file policy when the target is already on disk
//! 4. hand the part to the [`DownloadManager`] (or log it in dry-run)
//! 5. record the URL in the resume set after a successful enqueue
//!
//! The loop checks the interrupt flag between links, never mid-call.

mod existing;
mod filename;

pub use existing::{
    ExistingFileAction, ExistingFileDecision, ExistingFilePrompt, ExistingFileResolver,
    TerminalPrompt, UnknownExistingFileAction,
};
pub use filename::filename_from_url;

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info, warn};

use crate::idm::{DownloadManager, IdmError};
use crate::report::FilePart;

/// Counters and URLs produced by one queue pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueOutcome {
    /// Parts handed to the manager (or that would be, in dry-run).
    pub queued: usize,
    /// Duplicates, resume hits and declined conflicts.
    pub skipped: usize,
    /// Parts whose manager call failed.
    pub failed: usize,
    /// URLs queued in this pass, in order.
    pub queued_urls: Vec<String>,
    /// The interrupt flag stopped the loop early.
    pub interrupted: bool,
}

/// Why a queue pass stopped before the end.
#[derive(Debug)]
pub struct QueueAborted {
    /// Progress up to the fatal error.
    pub outcome: QueueOutcome,
    /// The error that ended the pass.
    pub error: IdmError,
}

enum ConflictOutcome {
    Proceed,
    Skip,
}

/// Sequential enqueue loop over validated parts.
pub struct QueueRunner<'a> {
    manager: Option<&'a dyn DownloadManager>,
    download_path: PathBuf,
    resume_mode: bool,
    existing: ExistingFileResolver,
}

impl<'a> QueueRunner<'a> {
    /// Creates a runner; `manager == None` means dry-run.
    #[must_use]
    pub fn new(
        manager: Option<&'a dyn DownloadManager>,
        download_path: PathBuf,
        resume_mode: bool,
        existing: ExistingFileResolver,
    ) -> Self {
        Self {
            manager,
            download_path,
            resume_mode,
            existing,
        }
    }

    fn is_dry_run(&self) -> bool {
        self.manager.is_none()
    }

    async fn resolve_conflict(&mut self, part: &FilePart) -> ConflictOutcome {
        let target = self.download_path.join(&part.filename);
        if !target.exists() {
            return ConflictOutcome::Proceed;
        }

        let decision = self.existing.decide(&part.filename).await;
        if !decision.overwrites() {
            info!(file = %target.display(), url = %part.url, "[SKIP][EXISTS]");
            return ConflictOutcome::Skip;
        }

        if target.is_dir() {
            warn!(file = %target.display(), "[SKIP][EXISTS] target is a directory");
            return ConflictOutcome::Skip;
        }
        if self.is_dry_run() {
            info!(file = %target.display(), "[OVERWRITE][EXISTS] would delete existing file");
            return ConflictOutcome::Proceed;
        }
        match fs::remove_file(&target) {
            Ok(()) => {
                info!(file = %target.display(), "[OVERWRITE][EXISTS] deleted existing file");
                ConflictOutcome::Proceed
            }
            Err(err) => {
                warn!(file = %target.display(), error = %err, "[SKIP][EXISTS] could not delete existing file");
                ConflictOutcome::Skip
            }
        }
    }

    /// Queues `parts` in order, updating `resume` after each success.
    ///
    /// # Errors
    ///
    /// Returns [`QueueAborted`] when the manager fails fatally (executable
    /// gone); `resume` already holds every URL queued before the failure.
    pub async fn run(
        &mut self,
        parts: &[FilePart],
        resume: &mut BTreeSet<String>,
        interrupted: &Arc<AtomicBool>,
    ) -> Result<QueueOutcome, QueueAborted> {
        let mut outcome = QueueOutcome::default();
        let mut seen = HashSet::new();

        for part in parts {
            if interrupted.load(Ordering::SeqCst) {
                warn!("Interrupted; stopping before the next link");
                outcome.interrupted = true;
                break;
            }

            if !seen.insert(part.url.clone()) {
                info!(url = %part.url, "[SKIP][DUPLICATE]");
                outcome.skipped += 1;
                continue;
            }
            if self.resume_mode && resume.contains(&part.url) {
                info!(url = %part.url, "[SKIP][RESUME]");
                outcome.skipped += 1;
                continue;
            }
            if let ConflictOutcome::Skip = self.resolve_conflict(part).await {
                outcome.skipped += 1;
                continue;
            }

            let Some(manager) = self.manager else {
                info!(
                    index = part.index,
                    url = %part.url,
                    file = %part.filename,
                    "[DRY-RUN] Would queue"
                );
                outcome.queued += 1;
                outcome.queued_urls.push(part.url.clone());
                continue;
            };

            match manager.queue_download(part).await {
                Ok(()) => {
                    info!(index = part.index, url = %part.url, file = %part.filename, "[QUEUED]");
                    outcome.queued += 1;
                    outcome.queued_urls.push(part.url.clone());
                    resume.insert(part.url.clone());
                }
                Err(error) if error.is_fatal() => {
                    error!(url = %part.url, %error, "IDM unavailable; stopping queue");
                    return Err(QueueAborted { outcome, error });
                }
                Err(error) => {
                    warn!(url = %part.url, %error, "[QUEUE FAILED]");
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }
}

impl std::fmt::Debug for QueueRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueRunner")
            .field("dry_run", &self.is_dry_run())
            .field("download_path", &self.download_path)
            .field("resume_mode", &self.resume_mode)
            .finish_non_exhaustive()
    }
}

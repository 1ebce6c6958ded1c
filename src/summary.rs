//! End-of-run summary.

use std::fmt;

use crate::input::InputMode;
use crate::queue::QueueOutcome;
use crate::report::GenerationReport;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Overall state of the IDM queue after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    /// Nothing was sent to IDM on purpose.
    DryRun,
    /// At least one link was queued.
    Ready,
    /// Every valid link was skipped.
    NothingNew,
    /// Nothing was queued and nothing was skipped.
    NotQueued,
}

impl QueueStatus {
    /// Picks the label for a run.
    #[must_use]
    pub fn from_counts(dry_run: bool, queued: usize, skipped: usize) -> Self {
        if dry_run {
            Self::DryRun
        } else if queued > 0 {
            Self::Ready
        } else if skipped > 0 {
            Self::NothingNew
        } else {
            Self::NotQueued
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::DryRun => "DRY-RUN",
            Self::Ready => "READY IN IDM QUEUE",
            Self::NothingNew => "NO NEW QUEUE (SKIPPED)",
            Self::NotQueued => "NOT QUEUED",
        }
    }
}

/// Numbers reported at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Input source used.
    pub mode: InputMode,
    /// Links accepted for queueing.
    pub total_files: usize,
    /// Candidates examined.
    pub urls_checked: usize,
    /// Sum of known sizes.
    pub total_size_bytes: u64,
    /// Links queued (or that would be, in dry-run).
    pub queued: usize,
    /// Duplicates, resume hits and declined conflicts.
    pub skipped: usize,
    /// Links whose IDM call failed.
    pub failed: usize,
    /// Links rejected by resolution or validation.
    pub rejected: usize,
    /// Why link building stopped.
    pub stop_reason: String,
    /// Where link building stopped.
    pub stop_index: Option<u64>,
    /// Queue state label.
    pub status: QueueStatus,
    /// The run was cut short by Ctrl+C.
    pub interrupted: bool,
}

impl RunSummary {
    /// Combines the link report and queue outcome.
    #[must_use]
    pub fn new(mode: InputMode, report: &GenerationReport, outcome: &QueueOutcome, dry_run: bool) -> Self {
        Self {
            mode,
            total_files: report.parts.len(),
            urls_checked: report.examined_count,
            total_size_bytes: report.total_size_bytes(),
            queued: outcome.queued,
            skipped: outcome.skipped,
            failed: outcome.failed,
            rejected: report.rejected.len(),
            stop_reason: report.stop_reason.clone(),
            stop_index: report.stop_index,
            status: QueueStatus::from_counts(dry_run, outcome.queued, outcome.skipped),
            interrupted: report.interrupted || outcome.interrupted,
        }
    }
}

/// `12.34 MB`
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(size_bytes: u64) -> String {
    format!("{:.2} MB", size_bytes as f64 / BYTES_PER_MB)
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== SUMMARY =====")?;
        writeln!(f, "Input mode           : {}", self.mode)?;
        writeln!(f, "Total files detected : {}", self.total_files)?;
        writeln!(f, "Total URLs checked   : {}", self.urls_checked)?;
        writeln!(f, "Total size estimate  : {}", format_size(self.total_size_bytes))?;
        writeln!(f, "Queued files         : {}", self.queued)?;
        writeln!(f, "Skipped (resume/file): {}", self.skipped)?;
        if self.failed > 0 {
            writeln!(f, "Failed (IDM)         : {}", self.failed)?;
        }
        writeln!(f, "Rejected links       : {}", self.rejected)?;
        writeln!(f, "Stop reason          : {}", self.stop_reason)?;
        match self.stop_index {
            Some(index) => writeln!(f, "Stop index           : {index}")?,
            None => writeln!(f, "Stop index           : -")?,
        }
        if self.interrupted {
            writeln!(f, "Interrupted          : yes (partial progress saved)")?;
        }
        write!(f, "Queue status         : {}", self.status.label())
    }
}

//! Link-set data shared by the input, queue and summary stages.

use std::fmt;

/// A validated link ready to hand to the download manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// 1-based position in explicit-link modes; the part number in generated mode.
    pub index: u64,
    /// Target URL (after landing-page resolution).
    pub url: String,
    /// Local filename passed to IDM.
    pub filename: String,
    /// Reported size in bytes, 0 when unknown.
    pub size_bytes: u64,
}

/// Pipeline stage that turned a link away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionStage {
    /// Landing page could not be resolved.
    Resolve,
    /// A validation predicate failed.
    Validate,
}

impl fmt::Display for RejectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => f.write_str("resolve"),
            Self::Validate => f.write_str("validate"),
        }
    }
}

/// A link excluded from the queue and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLink {
    /// The candidate URL as given.
    pub url: String,
    /// Where it was turned away.
    pub stage: RejectionStage,
    /// Human-readable reason.
    pub reason: String,
}

/// Stop reason when Ctrl+C arrives while links are still being built.
pub const INTERRUPTED_STOP_REASON: &str = "interrupted by user";

/// Result of building the link set for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Accepted links in queue order.
    pub parts: Vec<FilePart>,
    /// Candidates probed or resolved.
    pub examined_count: usize,
    /// Why building stopped.
    pub stop_reason: String,
    /// Index at which building stopped, when meaningful.
    pub stop_index: Option<u64>,
    /// Links excluded along the way.
    pub rejected: Vec<RejectedLink>,
    /// Building stopped early on Ctrl+C.
    pub interrupted: bool,
}

impl GenerationReport {
    /// Marks the report as cut short by Ctrl+C before `index` was examined.
    pub fn mark_interrupted(&mut self, index: u64) {
        self.interrupted = true;
        self.stop_reason = INTERRUPTED_STOP_REASON.to_string();
        self.stop_index = Some(index);
    }

    /// Sum of the known part sizes in bytes.
    #[must_use]
    pub fn total_size_bytes(&self) -> u64 {
        self.parts
            .iter()
            .fold(0, |total, part| total.saturating_add(part.size_bytes))
    }
}

//! Generated-mode link discovery: walk part numbers until one fails.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::report::{FilePart, GenerationReport, RejectedLink, RejectionStage};
use crate::validator::LinkValidator;

use super::MultipartPattern;

/// Probes parts from `start_index` upward and keeps the valid prefix.
///
/// Stops at the first of: `end_index` exceeded, a repeated URL, an invalid
/// part, `max_part` URLs examined, or `interrupted` being set. An unknown
/// size counts as invalid here since it usually means the part does not exist.
#[tracing::instrument(skip(pattern, validator, interrupted))]
pub async fn generate_multipart(
    pattern: &MultipartPattern,
    start_index: u64,
    end_index: Option<u64>,
    max_part: u64,
    validator: &dyn LinkValidator,
    interrupted: &AtomicBool,
) -> GenerationReport {
    let mut report = GenerationReport {
        stop_reason: "completed".to_string(),
        ..GenerationReport::default()
    };
    let mut seen = HashSet::new();
    let mut index = start_index;
    let mut examined: u64 = 0;

    while examined < max_part {
        if interrupted.load(Ordering::SeqCst) {
            warn!(index, "Interrupted while generating parts");
            report.mark_interrupted(index);
            break;
        }
        if end_index.is_some_and(|end| index > end) {
            report.stop_reason = "reached end_index".to_string();
            break;
        }

        let url = pattern.build_url(index);
        examined += 1;

        if !seen.insert(url.clone()) {
            report.stop_reason = "duplicate URL generated".to_string();
            report.stop_index = Some(index);
            break;
        }

        let result = validator.validate(&url).await;
        if !result.is_valid() {
            let reason = result.reason();
            warn!(index, url = %url, reason = %reason, "[GENERATED PART INVALID] stopping");
            report.rejected.push(RejectedLink {
                url,
                stage: RejectionStage::Validate,
                reason: reason.clone(),
            });
            report.stop_reason = reason;
            report.stop_index = Some(index);
            break;
        }

        info!(index, url = %url, size_bytes = result.size_bytes, "[PART OK]");
        report.parts.push(FilePart {
            index,
            filename: MultipartPattern::filename_for(&url, index),
            url,
            size_bytes: result.size_bytes,
        });
        index += 1;
    }

    if examined >= max_part && !report.interrupted && report.stop_reason == "completed" {
        report.stop_reason = "reached max_part".to_string();
        report.stop_index = Some(index);
    }

    report.examined_count = usize::try_from(examined).unwrap_or(usize::MAX);
    report
}

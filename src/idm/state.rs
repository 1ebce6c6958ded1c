//! Cross-checking the resume set against IDM's own download list.
//!
//! IDM keeps per-download records under `%APPDATA%/IDM/DwnlData`. The files
//! are not a documented format, so matching is a plain substring search over
//! their lowercased contents.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::resume::resume_tokens;

/// Files larger than this are not IDM records and are skipped.
const MAX_STATE_FILE_BYTES: u64 = 2 * 1024 * 1024;

/// Reads every small file under `dir` into one lowercased text blob.
///
/// Returns `None` when the directory is missing or nothing readable was found.
#[must_use]
pub fn read_idm_state_text(dir: &Path) -> Option<String> {
    if !dir.is_dir() {
        return None;
    }

    let mut text = String::new();
    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
    {
        let small_enough = entry
            .metadata()
            .is_ok_and(|meta| meta.len() <= MAX_STATE_FILE_BYTES);
        if !small_enough {
            continue;
        }
        match fs::read(entry.path()) {
            // Latin-1: every byte maps to one char, so binary records never fail to decode.
            Ok(bytes) => {
                text.extend(bytes.iter().map(|&b| char::from(b).to_ascii_lowercase()));
                text.push('\n');
            }
            Err(error) => debug!(path = %entry.path().display(), %error, "Skipping unreadable IDM state file"),
        }
    }

    (!text.trim().is_empty()).then_some(text)
}

/// Keeps only resume URLs that IDM still knows about.
///
/// A URL is kept when any of its resume tokens occurs in the IDM state text.
/// Without readable state the set is returned unchanged.
#[must_use]
pub fn reconcile_with_idm_state(queued: BTreeSet<String>, state_dir: &Path) -> BTreeSet<String> {
    let Some(state_text) = read_idm_state_text(state_dir) else {
        debug!(dir = %state_dir.display(), "No readable IDM state; resume set unchanged");
        return queued;
    };
    reconcile_with_text(queued, &state_text)
}

pub(crate) fn reconcile_with_text(queued: BTreeSet<String>, state_text: &str) -> BTreeSet<String> {
    let before = queued.len();
    let kept: BTreeSet<String> = queued
        .into_iter()
        .filter(|url| {
            resume_tokens(url)
                .iter()
                .any(|token| state_text.contains(token.as_str()))
        })
        .collect();

    let removed = before - kept.len();
    if removed > 0 {
        warn!(removed, "Resume sync: removed {removed} URL(s) not found in IDM state");
    }
    kept
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_read_state_missing_dir_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_idm_state_text(&dir.path().join("nope")).is_none());
        assert!(read_idm_state_text(dir.path()).is_none());
    }

    #[test]
    fn test_reconcile_keeps_urls_known_to_idm() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("DwnlData").join("user");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            nested.join("record_1.txt"),
            b"\x00\x01URL=HTTPS://H.EXAMPLE/DL/ABC\x00Game.part01.rar\xff",
        )
        .unwrap();

        let queued = set(&[
            "https://h.example/dl/abc",
            "https://h.example/dl/zzz#Game.part01.rar",
            "https://h.example/dl/gone",
        ]);
        let kept = reconcile_with_idm_state(queued, dir.path());
        assert_eq!(
            kept,
            set(&["https://h.example/dl/abc", "https://h.example/dl/zzz#Game.part01.rar"])
        );
    }

    #[test]
    fn test_reconcile_without_state_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let queued = set(&["https://h.example/dl/abc"]);
        assert_eq!(reconcile_with_idm_state(queued.clone(), dir.path()), queued);
    }

    #[test]
    fn test_reconcile_skips_oversized_files() {
        let dir = TempDir::new().unwrap();
        let mut big = vec![b' '; usize::try_from(MAX_STATE_FILE_BYTES).unwrap() + 1];
        big.extend_from_slice(b"https://h.example/dl/abc");
        fs::write(dir.path().join("big.bin"), big).unwrap();
        fs::write(dir.path().join("small.txt"), b"other").unwrap();

        let kept = reconcile_with_idm_state(set(&["https://h.example/dl/abc"]), dir.path());
        assert!(kept.is_empty());
    }
}

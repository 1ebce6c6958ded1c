//! Auto-detection of the IDM executable.

use std::path::{Path, PathBuf};

/// Standard install locations, checked in order.
pub const DEFAULT_INSTALL_PATHS: [&str; 2] = [
    "C:/Program Files (x86)/Internet Download Manager/IDMan.exe",
    "C:/Program Files/Internet Download Manager/IDMan.exe",
];

/// Executable names searched on `PATH` after the install locations.
const PATH_NAMES: [&str; 2] = ["IDMan", "IDMan.exe"];

/// Finds IDM in the standard install locations, then on `PATH`.
#[must_use]
pub fn detect_idm_path() -> Option<PathBuf> {
    detect_with(|path| path.is_file(), |name| which::which(name).ok())
}

fn detect_with(
    exists: impl Fn(&Path) -> bool,
    search_path: impl Fn(&str) -> Option<PathBuf>,
) -> Option<PathBuf> {
    DEFAULT_INSTALL_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|candidate| exists(candidate))
        .or_else(|| PATH_NAMES.iter().find_map(|name| search_path(name)))
}

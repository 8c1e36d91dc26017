//! Filesystem queries used by detectors and probes.
//!
//! Everything here treats absence as data: a missing directory lists as
//! empty and sizes as zero.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Total size in bytes of all files below `path`. Symlinks are not followed.
pub fn dir_size(path: &Path) -> u64 {
    if !path.exists() {
        return 0;
    }
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

/// Immediate sub-directories of `path`, sorted by name.
pub fn list_dirs(path: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(path) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Read a file, treating any failure as absence.
pub fn read_optional(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

/// Read a one-line file such as `.nvmrc` or an alias file.
pub fn read_first_line(path: &Path) -> Option<String> {
    read_optional(path)?
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
}

/// Resolve symlinks, returning `None` if the path cannot be canonicalized.
pub fn real_path(path: &Path) -> Option<PathBuf> {
    fs::canonicalize(path).ok()
}

/// Whether `path` lies under `base`, comparing both the given paths and
/// their canonical forms.
pub fn is_within(path: &Path, base: &Path) -> bool {
    if path.starts_with(base) {
        return true;
    }
    match (real_path(path), real_path(base)) {
        (Some(p), Some(b)) => p.starts_with(b),
        _ => false,
    }
}

/// Format a byte count for display (`1.5 GB`).
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

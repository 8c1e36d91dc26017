//! Write-permission checks for npm's global and cache directories.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::platform::{is_elevated, Platform};

/// One permission check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionCheck {
    pub name: String,
    pub path: PathBuf,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// All permission checks plus the elevation flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionReport {
    pub running_as_root: bool,
    pub checks: Vec<PermissionCheck>,
}

impl PermissionReport {
    pub fn failing(&self) -> impl Iterator<Item = &PermissionCheck> {
        self.checks.iter().filter(|c| !c.ok)
    }
}

/// Directory npm installs global packages into under `prefix`.
pub fn global_modules_dir(platform: Platform, prefix: &Path) -> PathBuf {
    if platform.is_windows() {
        prefix.join("node_modules")
    } else {
        prefix.join("lib/node_modules")
    }
}

/// Check that `dir` (or its nearest existing ancestor) accepts new files.
pub fn check_writable(name: &str, dir: &Path) -> PermissionCheck {
    let target = dir
        .ancestors()
        .find(|p| p.is_dir())
        .unwrap_or(dir)
        .to_path_buf();
    let result = tempfile::Builder::new()
        .prefix(".node-doctor-write-test-")
        .tempfile_in(&target);
    match result {
        Ok(_) => PermissionCheck {
            name: name.to_string(),
            path: dir.to_path_buf(),
            ok: true,
            message: None,
        },
        Err(e) => PermissionCheck {
            name: name.to_string(),
            path: dir.to_path_buf(),
            ok: false,
            message: Some(format!("{} is not writable: {}", target.display(), e)),
        },
    }
}

/// Run the permission checks for the given npm directories.
pub fn check_permissions(
    platform: Platform,
    npm_prefix: Option<&Path>,
    npm_cache: Option<&Path>,
) -> PermissionReport {
    let mut checks = Vec::new();
    if let Some(prefix) = npm_prefix {
        checks.push(check_writable(
            "global-modules",
            &global_modules_dir(platform, prefix),
        ));
    }
    if let Some(cache) = npm_cache {
        checks.push(check_writable("npm-cache", cache));
    }
    PermissionReport {
        running_as_root: is_elevated(),
        checks,
    }
}

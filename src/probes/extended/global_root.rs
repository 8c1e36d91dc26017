//! `npm root -g` versus the active runtime's installation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::platform::Platform;
use crate::sys::fs::is_within;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalRootCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Installation directory of the active runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_under: Option<PathBuf>,
    pub owner: String,
    pub matches: bool,
}

/// Installation root of a runtime executable (`<root>/bin/node` on unix,
/// `<root>/node.exe` on Windows).
pub fn install_root(platform: Platform, executable: &Path) -> Option<PathBuf> {
    let bin = executable.parent()?;
    if platform.is_windows() {
        Some(bin.to_path_buf())
    } else {
        bin.parent().map(Path::to_path_buf)
    }
}

/// Check that global packages install into the active runtime's tree.
///
/// Runtimes owned by `system` or `unknown` share global roots, so only
/// manager-owned runtimes are compared.
pub fn check_global_root(
    platform: Platform,
    root: Option<&Path>,
    active_executable: Option<&Path>,
    owner: &str,
) -> GlobalRootCheck {
    let expected_under = active_executable.and_then(|exe| install_root(platform, exe));
    let managed = owner != "system" && owner != "unknown" && owner != "volta";
    let matches = match (root, expected_under.as_deref()) {
        (Some(root), Some(expected)) if managed => is_within(root, expected),
        _ => true,
    };
    GlobalRootCheck {
        root: root.map(Path::to_path_buf),
        expected_under,
        owner: owner.to_string(),
        matches,
    }
}

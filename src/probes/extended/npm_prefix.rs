//! npm global prefix versus the active manager.
//!
//! When a manager owns the active runtime but `npm config get prefix`
//! points elsewhere, global installs land outside the manager and vanish
//! on the next version switch.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sys::fs::is_within;

/// Managers that redirect global installs themselves.
const PREFIX_EXEMPT: &[&str] = &["volta"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NpmPrefixCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_root: Option<PathBuf>,
    pub mismatch: bool,
}

/// Compare the prefix with the active manager's root.
pub fn check_npm_prefix(prefix: Option<&Path>, active: Option<(&str, &Path)>) -> NpmPrefixCheck {
    let mismatch = match (prefix, active) {
        (Some(prefix), Some((name, root))) if !PREFIX_EXEMPT.contains(&name) => {
            !is_within(prefix, root)
        }
        _ => false,
    };
    NpmPrefixCheck {
        prefix: prefix.map(Path::to_path_buf),
        active_manager: active.map(|(name, _)| name.to_string()),
        manager_root: active.map(|(_, root)| root.to_path_buf()),
        mismatch,
    }
}

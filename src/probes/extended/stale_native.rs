//! Native addons built for a different runtime major.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::sys::fs::list_dirs;
use crate::version;

/// Major-version gap at which compiled addons are considered stale.
pub const STALE_MAJOR_GAP: u64 = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaleNativeDeps {
    /// Packages with a compiled `build/Release/*.node` addon.
    pub native_modules: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engines_major: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_major: Option<u64>,
    pub stale: bool,
}

fn has_compiled_addon(package: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(package.join("build/Release")) else {
        return false;
    };
    entries
        .filter_map(|e| e.ok())
        .any(|e| e.path().extension().is_some_and(|ext| ext == "node"))
}

/// Top-level packages (including scoped ones) that carry compiled addons.
pub fn find_native_modules(node_modules: &Path) -> Vec<String> {
    let mut found = Vec::new();
    for dir in list_dirs(node_modules) {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if name.starts_with('@') {
            for scoped in list_dirs(&dir) {
                if has_compiled_addon(&scoped) {
                    let child = scoped
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    found.push(format!("{}/{}", name, child));
                }
            }
        } else if has_compiled_addon(&dir) {
            found.push(name);
        }
    }
    found
}

/// Flag compiled addons when the declared engines major and the running
/// major are far apart.
pub fn check_stale_native(
    project_root: &Path,
    engines_node: Option<&str>,
    running: Option<&str>,
) -> StaleNativeDeps {
    let native_modules = find_native_modules(&project_root.join("node_modules"));
    let engines_major = engines_node.and_then(version::range_floor_major);
    let running_major = running.and_then(version::major);
    let stale = !native_modules.is_empty()
        && matches!((engines_major, running_major), (Some(e), Some(r)) if e.abs_diff(r) >= STALE_MAJOR_GAP);
    StaleNativeDeps {
        native_modules,
        engines_major,
        running_major,
        stale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn addon(root: &Path, package: &str) {
        let release = root.join("node_modules").join(package).join("build/Release");
        fs::create_dir_all(&release).unwrap();
        fs::write(release.join("binding.node"), "").unwrap();
    }

    #[test]
    fn finds_plain_and_scoped_addons() {
        let temp = TempDir::new().unwrap();
        addon(temp.path(), "bcrypt");
        addon(temp.path(), "@serialport/bindings-cpp");
        fs::create_dir_all(temp.path().join("node_modules/lodash")).unwrap();

        let modules = find_native_modules(&temp.path().join("node_modules"));
        assert_eq!(modules, vec!["@serialport/bindings-cpp", "bcrypt"]);
    }

    #[test]
    fn two_major_gap_is_stale() {
        let temp = TempDir::new().unwrap();
        addon(temp.path(), "sharp");
        let result = check_stale_native(temp.path(), Some(">=18"), Some("22.1.0"));
        assert!(result.stale);
        assert_eq!(result.engines_major, Some(18));

        let result = check_stale_native(temp.path(), Some("^20"), Some("21.0.0"));
        assert!(!result.stale);
    }

    #[test]
    fn no_addons_is_never_stale() {
        let temp = TempDir::new().unwrap();
        let result = check_stale_native(temp.path(), Some("14"), Some("22.0.0"));
        assert!(!result.stale);
    }
}

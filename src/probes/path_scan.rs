//! PATH scan and manager attribution.
//!
//! Every runtime executable on PATH is attributed to the registered
//! detector whose base directory contains it (first registered match
//! wins). Entry 0 is the runtime a shell actually runs; the rest are
//! shadowed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::detectors::system::is_system_dir;
use crate::detectors::{DetectorRegistry, ScanResults};
use crate::net::{EolInfo, SecurityInfo};
use crate::platform::Platform;
use crate::sys::fs::is_within;

/// Owner label for executables in OS-standard directories.
pub const OWNER_SYSTEM: &str = "system";
/// Owner label when no manager claims an executable.
pub const OWNER_UNKNOWN: &str = "unknown";

/// One runtime executable found on PATH.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    pub executable: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_path: Option<PathBuf>,
    /// Version reported by `--version`, if it ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Owning manager, `system` or `unknown`.
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eol: Option<EolInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityInfo>,
}

/// Attribute an executable to a manager.
///
/// Both the PATH location and the resolved location are checked against
/// every detected manager's base directory in registration order.
pub fn classify_owner(
    registry: &DetectorRegistry,
    results: &ScanResults,
    platform: Platform,
    executable: &Path,
    real_path: Option<&Path>,
) -> String {
    for detector in registry.iter().filter(|d| !d.analysis_only()) {
        let Some(result) = results.get(detector.name()) else {
            continue;
        };
        let base = &result.base_dir;
        let owned = is_within(executable, base) || real_path.is_some_and(|r| is_within(r, base));
        if owned && detector.name() != "system" {
            return detector.name().to_string();
        }
    }

    let in_system_dir = executable
        .parent()
        .is_some_and(|dir| is_system_dir(platform, dir));
    if in_system_dir {
        OWNER_SYSTEM.to_string()
    } else {
        OWNER_UNKNOWN.to_string()
    }
}

/// Build annotated PATH nodes from the `path` sentinel's scan result.
pub fn scan_path(
    registry: &DetectorRegistry,
    results: &ScanResults,
    platform: Platform,
) -> Vec<PathNode> {
    let Some(found) = results.get("path") else {
        return Vec::new();
    };
    found
        .installations
        .iter()
        .map(|inst| PathNode {
            owner: classify_owner(
                registry,
                results,
                platform,
                &inst.executable,
                inst.real_path.as_deref(),
            ),
            executable: inst.executable.clone(),
            real_path: inst.real_path.clone(),
            version: inst.verified_version.clone(),
            eol: None,
            security: None,
        })
        .collect()
}

/// Managers that own at least one runtime on PATH, in PATH order.
pub fn active_managers(nodes: &[PathNode]) -> Vec<String> {
    let mut active: Vec<String> = Vec::new();
    for node in nodes {
        if node.owner == OWNER_SYSTEM || node.owner == OWNER_UNKNOWN {
            continue;
        }
        if !active.contains(&node.owner) {
            active.push(node.owner.clone());
        }
    }
    active
}

/// The manager owning PATH entry 0, if a manager owns it.
pub fn authoritative_manager(nodes: &[PathNode]) -> Option<&str> {
    nodes
        .first()
        .map(|node| node.owner.as_str())
        .filter(|owner| *owner != OWNER_SYSTEM && *owner != OWNER_UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::{DetectorResult, Installation};

    fn results_with(entries: &[(&str, &str)]) -> ScanResults {
        let mut results = ScanResults::new();
        for (name, base) in entries {
            results.insert(*name, Some(DetectorResult::new(*base)));
        }
        results
    }

    #[test]
    fn manager_base_dir_claims_executable() {
        let registry = DetectorRegistry::with_builtins().unwrap();
        let results = results_with(&[("nvm", "/home/u/.nvm"), ("volta", "/home/u/.volta")]);

        let owner = classify_owner(
            &registry,
            &results,
            Platform::Linux,
            Path::new("/home/u/.volta/bin/node"),
            None,
        );
        assert_eq!(owner, "volta");
    }

    #[test]
    fn nested_base_dirs_go_to_first_registered() {
        use crate::cli::commands::test_support::StubDetector;

        let stub = |name| StubDetector {
            name,
            can_delete: true,
            versions: Vec::new(),
        };
        let results = results_with(&[("outer", "/opt/x"), ("inner", "/opt/x/sub")]);
        let exe = Path::new("/opt/x/sub/bin/node");

        let mut outer_first = DetectorRegistry::new();
        outer_first.register(Box::new(stub("outer"))).unwrap();
        outer_first.register(Box::new(stub("inner"))).unwrap();
        assert_eq!(
            classify_owner(&outer_first, &results, Platform::Linux, exe, None),
            "outer"
        );

        let mut inner_first = DetectorRegistry::new();
        inner_first.register(Box::new(stub("inner"))).unwrap();
        inner_first.register(Box::new(stub("outer"))).unwrap();
        assert_eq!(
            classify_owner(&inner_first, &results, Platform::Linux, exe, None),
            "inner"
        );
    }

    #[test]
    fn entry_zero_decides_the_manager_in_use() {
        let node = |exe: &str, owner: &str| PathNode {
            executable: PathBuf::from(exe),
            real_path: None,
            version: None,
            owner: owner.to_string(),
            eol: None,
            security: None,
        };
        let shadowed = vec![node("/usr/bin/node", OWNER_SYSTEM), node("/home/u/.nvm/bin/node", "nvm")];
        assert_eq!(authoritative_manager(&shadowed), None);
        assert_eq!(active_managers(&shadowed), vec!["nvm"]);

        let managed = vec![node("/home/u/.nvm/bin/node", "nvm"), node("/usr/bin/node", OWNER_SYSTEM)];
        assert_eq!(authoritative_manager(&managed), Some("nvm"));
        assert_eq!(authoritative_manager(&[]), None);
    }

    #[test]
    fn real_path_is_also_checked() {
        let registry = DetectorRegistry::with_builtins().unwrap();
        let results = results_with(&[("nvm", "/home/u/.nvm")]);
        let owner = classify_owner(
            &registry,
            &results,
            Platform::Linux,
            Path::new("/usr/local/bin/node"),
            Some(Path::new("/home/u/.nvm/versions/node/v20.0.0/bin/node")),
        );
        assert_eq!(owner, "nvm");
    }

    #[test]
    fn falls_back_to_system_then_unknown() {
        let registry = DetectorRegistry::with_builtins().unwrap();
        let results = ScanResults::new();
        assert_eq!(
            classify_owner(&registry, &results, Platform::Linux, Path::new("/usr/bin/node"), None),
            OWNER_SYSTEM
        );
        assert_eq!(
            classify_owner(&registry, &results, Platform::Linux, Path::new("/srv/tools/node"), None),
            OWNER_UNKNOWN
        );
    }

    #[test]
    fn scan_path_uses_sentinel_result() {
        let registry = DetectorRegistry::with_builtins().unwrap();
        let mut results = results_with(&[("fnm", "/home/u/.fnm")]);
        let mut path = DetectorResult::new("/home/u/.fnm/aliases/default/bin");
        path.installations.push(
            Installation::new(
                "path",
                "20.0.0",
                "/home/u/.fnm/aliases/default/bin",
                "/home/u/.fnm/aliases/default/bin/node",
            )
            .with_verified_version("20.0.0"),
        );
        path.installations
            .push(Installation::new("path", "18.0.0", "/usr/bin", "/usr/bin/node"));
        results.insert("path", Some(path));

        let nodes = scan_path(&registry, &results, Platform::Linux);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].owner, "fnm");
        assert_eq!(nodes[0].version.as_deref(), Some("20.0.0"));
        assert_eq!(nodes[1].owner, OWNER_SYSTEM);
        assert_eq!(active_managers(&nodes), vec!["fnm"]);
    }
}

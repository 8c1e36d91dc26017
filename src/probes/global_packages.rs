//! Globally installed npm packages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::sys::command;
use crate::sys::fs::list_dirs;

/// Global package count above which the global namespace is considered
/// cluttered.
pub const GLOBAL_PACKAGE_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalPackage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Global package summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalPackages {
    /// `npm root -g`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    pub packages: Vec<GlobalPackage>,
}

impl GlobalPackages {
    pub fn count(&self) -> usize {
        self.packages.len()
    }
}

#[derive(Deserialize)]
struct NpmLs {
    #[serde(default)]
    dependencies: BTreeMap<String, NpmLsEntry>,
}

#[derive(Deserialize)]
struct NpmLsEntry {
    #[serde(default)]
    version: Option<String>,
}

/// Parse `npm ls -g --depth=0 --json`.
pub fn parse_npm_ls(json: &str) -> Option<Vec<GlobalPackage>> {
    let parsed: NpmLs = serde_json::from_str(json).ok()?;
    Some(
        parsed
            .dependencies
            .into_iter()
            .map(|(name, entry)| GlobalPackage {
                name,
                version: entry.version,
            })
            .collect(),
    )
}

/// List packages directly from a global `node_modules`, expanding scopes.
pub fn list_root(root: &Path) -> Vec<GlobalPackage> {
    let mut packages = Vec::new();
    for dir in list_dirs(root) {
        let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if name.starts_with('@') {
            for scoped in list_dirs(&dir) {
                if let Some(child) = scoped.file_name().and_then(|n| n.to_str()) {
                    packages.push(GlobalPackage {
                        name: format!("{}/{}", name, child),
                        version: None,
                    });
                }
            }
        } else {
            packages.push(GlobalPackage {
                name: name.to_string(),
                version: None,
            });
        }
    }
    packages
}

/// Query npm for global packages; falls back to listing `npm root -g`.
pub fn probe_global_packages() -> Option<GlobalPackages> {
    let root = command::run_line("npm", &["root", "-g"]).map(PathBuf::from);
    let packages = command::run("npm", &["ls", "-g", "--depth=0", "--json"])
        .and_then(|o| parse_npm_ls(&o.stdout))
        .or_else(|| root.as_deref().map(list_root))?;
    Some(GlobalPackages { root, packages })
}

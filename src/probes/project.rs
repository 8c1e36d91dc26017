//! Project manifest, version pins and lockfiles in the working directory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::detectors::managed::tool_versions_entry;
use crate::sys::fs::{read_first_line, read_optional};

/// Lockfiles and the package manager that writes them.
pub const LOCKFILES: &[(&str, &str)] = &[
    ("package-lock.json", "npm"),
    ("npm-shrinkwrap.json", "npm"),
    ("yarn.lock", "yarn"),
    ("pnpm-lock.yaml", "pnpm"),
    ("bun.lockb", "bun"),
    ("bun.lock", "bun"),
];

/// Where a runtime version pin was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PinSource {
    Nvmrc,
    NodeVersion,
    ToolVersions,
    Volta,
    Engines,
}

impl std::fmt::Display for PinSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinSource::Nvmrc => write!(f, ".nvmrc"),
            PinSource::NodeVersion => write!(f, ".node-version"),
            PinSource::ToolVersions => write!(f, ".tool-versions"),
            PinSource::Volta => write!(f, "package.json volta.node"),
            PinSource::Engines => write!(f, "package.json engines.node"),
        }
    }
}

/// A declared runtime version or range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionPin {
    pub source: PinSource,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lockfile {
    pub file: String,
    pub manager: String,
}

/// What the working directory declares about its runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub root: PathBuf,
    pub has_manifest: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub pins: Vec<VersionPin>,
    /// `engines` from package.json (`node`, `npm`, `pnpm`, ...).
    pub engines: BTreeMap<String, String>,
    /// `packageManager` from package.json (`pnpm@9.1.0`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,
    pub lockfiles: Vec<Lockfile>,
    pub has_node_modules: bool,
}

impl ProjectInfo {
    /// First pin from a pin file (not `engines`), in priority order.
    pub fn pinned_version(&self) -> Option<&VersionPin> {
        self.pins.iter().find(|p| p.source != PinSource::Engines)
    }

    pub fn engines_node(&self) -> Option<&str> {
        self.engines.get("node").map(String::as_str)
    }

    /// Distinct package managers implied by the lockfiles.
    pub fn lockfile_managers(&self) -> Vec<&str> {
        let mut managers: Vec<&str> = Vec::new();
        for lock in &self.lockfiles {
            if !managers.contains(&lock.manager.as_str()) {
                managers.push(&lock.manager);
            }
        }
        managers
    }
}

#[derive(Deserialize, Default)]
struct Manifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    engines: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "packageManager")]
    package_manager: Option<String>,
    #[serde(default)]
    volta: Option<VoltaSection>,
}

#[derive(Deserialize, Default)]
struct VoltaSection {
    #[serde(default)]
    node: Option<String>,
}

/// Read the project in `root`. A missing or malformed manifest is treated
/// as absent.
pub fn probe_project(root: &Path) -> ProjectInfo {
    let mut info = ProjectInfo {
        root: root.to_path_buf(),
        ..Default::default()
    };

    if let Some(pin) = read_first_line(&root.join(".nvmrc")) {
        info.pins.push(VersionPin {
            source: PinSource::Nvmrc,
            value: pin,
        });
    }
    if let Some(pin) = read_first_line(&root.join(".node-version")) {
        info.pins.push(VersionPin {
            source: PinSource::NodeVersion,
            value: pin,
        });
    }
    if let Some(pin) = read_optional(&root.join(".tool-versions"))
        .and_then(|c| tool_versions_entry(&c, "nodejs"))
    {
        info.pins.push(VersionPin {
            source: PinSource::ToolVersions,
            value: pin,
        });
    }

    if let Some(content) = read_optional(&root.join("package.json")) {
        info.has_manifest = true;
        match serde_json::from_str::<Manifest>(&content) {
            Ok(manifest) => apply_manifest(&mut info, manifest),
            Err(e) => tracing::debug!("Ignoring malformed package.json: {}", e),
        }
    }

    info.lockfiles = LOCKFILES
        .iter()
        .filter(|(file, _)| root.join(file).is_file())
        .map(|(file, manager)| Lockfile {
            file: file.to_string(),
            manager: manager.to_string(),
        })
        .collect();
    info.has_node_modules = root.join("node_modules").is_dir();
    info
}

fn apply_manifest(info: &mut ProjectInfo, manifest: Manifest) {
    info.name = manifest.name;
    info.package_manager = manifest.package_manager;
    info.engines = manifest
        .engines
        .into_iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
        .collect();

    if let Some(node) = manifest.volta.and_then(|v| v.node) {
        info.pins.push(VersionPin {
            source: PinSource::Volta,
            value: node,
        });
    }
    if let Some(range) = info.engines.get("node") {
        info.pins.push(VersionPin {
            source: PinSource::Engines,
            value: range.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reads_pins_manifest_and_lockfiles() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".nvmrc"), "20\n").unwrap();
        fs::write(temp.path().join(".tool-versions"), "nodejs 20.11.0\n").unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"name":"app","engines":{"node":">=18","pnpm":"9"},"packageManager":"pnpm@9.1.0","volta":{"node":"20.11.0"}}"#,
        )
        .unwrap();
        fs::write(temp.path().join("pnpm-lock.yaml"), "").unwrap();
        fs::write(temp.path().join("package-lock.json"), "{}").unwrap();

        let info = probe_project(temp.path());

        assert!(info.has_manifest);
        assert_eq!(info.name.as_deref(), Some("app"));
        let sources: Vec<_> = info.pins.iter().map(|p| p.source).collect();
        assert_eq!(
            sources,
            vec![
                PinSource::Nvmrc,
                PinSource::ToolVersions,
                PinSource::Volta,
                PinSource::Engines
            ]
        );
        assert_eq!(info.engines_node(), Some(">=18"));
        assert_eq!(info.package_manager.as_deref(), Some("pnpm@9.1.0"));
        assert_eq!(info.lockfile_managers(), vec!["npm", "pnpm"]);
        assert_eq!(info.pinned_version().unwrap().value, "20");
    }

    #[test]
    fn empty_directory_has_nothing() {
        let temp = TempDir::new().unwrap();
        let info = probe_project(temp.path());
        assert!(!info.has_manifest);
        assert!(info.pins.is_empty());
        assert!(info.lockfiles.is_empty());
    }

    #[test]
    fn malformed_manifest_is_ignored() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{ nope").unwrap();
        let info = probe_project(temp.path());
        assert!(info.has_manifest);
        assert!(info.engines.is_empty());
    }
}

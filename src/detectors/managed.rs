//! Table-driven detectors for directory-per-version managers.
//!
//! nvm, fnm, Volta, n, asdf, mise, nodenv, nvs and nvm-windows all keep one
//! directory per installed version under a root that can be relocated with
//! an environment variable. They differ only in where that root lives, how
//! the version directories are nested and where the default version is
//! recorded, so one [`ManagedDetector`] covers all of them.

use std::path::{Path, PathBuf};

use super::{Detector, DetectorResult, Installation};
use crate::platform::{HostEnv, Platform};
use crate::sys::fs::{dir_size, list_dirs, read_first_line, read_optional};
use crate::version;

/// Where a manager records its default version.
#[derive(Debug, Clone, Copy)]
pub enum AliasSource {
    /// No default recorded.
    None,
    /// A text file or symlink relative to the manager root.
    RootFile(&'static str),
    /// The `nodejs` line of `~/.tool-versions`.
    HomeToolVersions,
    /// `node.runtime` in `tools/user/platform.json` under the root.
    VoltaPlatform,
    /// The `node` entry of `~/.config/mise/config.toml`.
    MiseGlobalConfig,
}

/// Definition of a version manager to detect.
#[derive(Debug)]
pub struct ManagerDef {
    pub name: &'static str,
    pub display_name: &'static str,
    pub icon: &'static str,
    pub platforms: &'static [Platform],
    /// Variable that relocates the manager root.
    pub env_var: Option<&'static str>,
    /// Appended to the env var's value to reach the root (`n` uses a prefix).
    pub env_subdir: &'static str,
    /// Whether the manager misbehaves when `env_var` is unset.
    pub env_required: bool,
    /// Candidate roots relative to the home directory.
    pub default_paths: &'static [&'static str],
    /// Candidate absolute roots.
    pub absolute_paths: &'static [&'static str],
    /// Directory under the root holding one entry per version.
    pub versions_subdir: &'static str,
    /// Path from a version directory to the installation root.
    pub install_subdir: &'static str,
    /// Version directories contain one sub-directory per architecture.
    pub arch_subdirs: bool,
    pub default_alias: AliasSource,
}

/// Known version manager definitions, in registration order.
pub const MANAGER_DEFS: &[ManagerDef] = &[
    ManagerDef {
        name: "nvm",
        display_name: "Node Version Manager",
        icon: "⬢",
        platforms: &Platform::UNIX,
        env_var: Some("NVM_DIR"),
        env_subdir: "",
        env_required: true,
        default_paths: &[".nvm", ".config/nvm"],
        absolute_paths: &[],
        versions_subdir: "versions/node",
        install_subdir: "",
        arch_subdirs: false,
        default_alias: AliasSource::RootFile("alias/default"),
    },
    ManagerDef {
        name: "nvm-windows",
        display_name: "nvm for Windows",
        icon: "⬢",
        platforms: &[Platform::Win32],
        env_var: Some("NVM_HOME"),
        env_subdir: "",
        env_required: true,
        default_paths: &["AppData/Roaming/nvm"],
        absolute_paths: &[],
        versions_subdir: "",
        install_subdir: "",
        arch_subdirs: false,
        default_alias: AliasSource::None,
    },
    ManagerDef {
        name: "fnm",
        display_name: "Fast Node Manager",
        icon: "⚡",
        platforms: &Platform::ALL,
        env_var: Some("FNM_DIR"),
        env_subdir: "",
        env_required: false,
        default_paths: &[
            ".local/share/fnm",
            ".fnm",
            "Library/Application Support/fnm",
            "AppData/Roaming/fnm",
        ],
        absolute_paths: &[],
        versions_subdir: "node-versions",
        install_subdir: "installation",
        arch_subdirs: false,
        default_alias: AliasSource::RootFile("aliases/default"),
    },
    ManagerDef {
        name: "volta",
        display_name: "Volta",
        icon: "⚓",
        platforms: &Platform::ALL,
        env_var: Some("VOLTA_HOME"),
        env_subdir: "",
        env_required: false,
        default_paths: &[".volta", "AppData/Local/Volta"],
        absolute_paths: &[],
        versions_subdir: "tools/image/node",
        install_subdir: "",
        arch_subdirs: false,
        default_alias: AliasSource::VoltaPlatform,
    },
    ManagerDef {
        name: "n",
        display_name: "n",
        icon: "n",
        platforms: &Platform::UNIX,
        env_var: Some("N_PREFIX"),
        env_subdir: "n",
        env_required: false,
        default_paths: &[],
        absolute_paths: &["/usr/local/n"],
        versions_subdir: "versions/node",
        install_subdir: "",
        arch_subdirs: false,
        default_alias: AliasSource::None,
    },
    ManagerDef {
        name: "asdf",
        display_name: "asdf",
        icon: "◆",
        platforms: &Platform::UNIX,
        env_var: Some("ASDF_DATA_DIR"),
        env_subdir: "",
        env_required: false,
        default_paths: &[".asdf"],
        absolute_paths: &[],
        versions_subdir: "installs/nodejs",
        install_subdir: "",
        arch_subdirs: false,
        default_alias: AliasSource::HomeToolVersions,
    },
    ManagerDef {
        name: "mise",
        display_name: "mise",
        icon: "◇",
        platforms: &Platform::ALL,
        env_var: Some("MISE_DATA_DIR"),
        env_subdir: "",
        env_required: false,
        default_paths: &[".local/share/mise", "AppData/Local/mise"],
        absolute_paths: &[],
        versions_subdir: "installs/node",
        install_subdir: "",
        arch_subdirs: false,
        default_alias: AliasSource::MiseGlobalConfig,
    },
    ManagerDef {
        name: "nodenv",
        display_name: "nodenv",
        icon: "◉",
        platforms: &Platform::UNIX,
        env_var: Some("NODENV_ROOT"),
        env_subdir: "",
        env_required: false,
        default_paths: &[".nodenv"],
        absolute_paths: &[],
        versions_subdir: "versions",
        install_subdir: "",
        arch_subdirs: false,
        default_alias: AliasSource::RootFile("version"),
    },
    ManagerDef {
        name: "nvs",
        display_name: "Node Version Switcher",
        icon: "⇄",
        platforms: &Platform::ALL,
        env_var: Some("NVS_HOME"),
        env_subdir: "",
        env_required: false,
        default_paths: &[".nvs", "AppData/Local/nvs"],
        absolute_paths: &[],
        versions_subdir: "node",
        install_subdir: "",
        arch_subdirs: true,
        default_alias: AliasSource::RootFile("default"),
    },
];

/// Look up a manager definition by detector name.
pub fn find_def(name: &str) -> Option<&'static ManagerDef> {
    MANAGER_DEFS.iter().find(|def| def.name == name)
}

/// Detector backed by a [`ManagerDef`].
pub struct ManagedDetector {
    def: &'static ManagerDef,
}

impl ManagedDetector {
    pub fn new(def: &'static ManagerDef) -> Self {
        Self { def }
    }

    /// Resolve the manager root: the env var if set, else the first
    /// default location that exists.
    fn locate_root(&self, env: &HostEnv) -> Option<PathBuf> {
        if let Some(var) = self.def.env_var {
            if let Some(value) = env.var_path(var) {
                let root = if self.def.env_subdir.is_empty() {
                    value
                } else {
                    value.join(self.def.env_subdir)
                };
                // An explicit override is authoritative even when it is wrong
                return root.is_dir().then_some(root);
            }
        }

        self.def
            .default_paths
            .iter()
            .map(|rel| env.home_join(rel))
            .chain(self.def.absolute_paths.iter().map(PathBuf::from))
            .find(|p| p.is_dir())
    }

    fn installations(&self, env: &HostEnv, versions_dir: &Path) -> Vec<Installation> {
        let mut found = Vec::new();
        for version_dir in list_dirs(versions_dir) {
            if is_symlink(&version_dir) {
                continue;
            }
            let Some(raw) = version_dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !version::looks_like_version(raw) {
                continue;
            }
            let version = version::normalize(raw);

            if self.def.arch_subdirs {
                for arch_dir in list_dirs(&version_dir) {
                    let arch = arch_dir
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    if let Some(inst) = self.installation(env, &version, &arch_dir) {
                        found.push(inst.with_arch(arch));
                    }
                }
            } else {
                let root = if self.def.install_subdir.is_empty() {
                    version_dir.clone()
                } else {
                    version_dir.join(self.def.install_subdir)
                };
                if let Some(inst) = self.installation(env, &version, &root) {
                    found.push(inst);
                }
            }
        }
        found
    }

    fn installation(&self, env: &HostEnv, version: &str, root: &Path) -> Option<Installation> {
        let executable = root.join(env.platform.node_bin_subpath());
        if !executable.is_file() {
            tracing::debug!("{}: no executable at {}", self.def.name, executable.display());
            return None;
        }
        Some(
            Installation::new(self.def.name, version, root, executable)
                .with_size(dir_size(root)),
        )
    }

    fn default_version(&self, env: &HostEnv, root: &Path) -> Option<String> {
        let raw = match self.def.default_alias {
            AliasSource::None => None,
            AliasSource::RootFile(rel) => read_alias(&root.join(rel)),
            AliasSource::HomeToolVersions => {
                tool_versions_entry(&read_optional(&env.home_join(".tool-versions"))?, "nodejs")
            }
            AliasSource::VoltaPlatform => {
                volta_runtime(&read_optional(&root.join("tools/user/platform.json"))?)
            }
            AliasSource::MiseGlobalConfig => {
                mise_tool_entry(&read_optional(&env.home_join(".config/mise/config.toml"))?, "node")
            }
        }?;
        Some(version::normalize(&raw))
    }
}

impl Detector for ManagedDetector {
    fn name(&self) -> &str {
        self.def.name
    }

    fn display_name(&self) -> &str {
        self.def.display_name
    }

    fn icon(&self) -> &str {
        self.def.icon
    }

    fn platforms(&self) -> &[Platform] {
        self.def.platforms
    }

    fn can_delete(&self) -> bool {
        true
    }

    fn detect(&self, env: &HostEnv) -> anyhow::Result<Option<DetectorResult>> {
        let Some(root) = self.locate_root(env) else {
            return Ok(None);
        };

        let versions_dir = if self.def.versions_subdir.is_empty() {
            root.clone()
        } else {
            root.join(self.def.versions_subdir)
        };

        let mut result = DetectorResult::new(&root);
        result.installations = self.installations(env, &versions_dir);
        result.versions_dir = Some(versions_dir);
        result.default_version = self.default_version(env, &root);
        if let Some(var) = self.def.env_var {
            result.env_var = Some(var.to_string());
            result.env_var_set = Some(env.has_var(var));
        }
        Ok(Some(result))
    }
}

fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Read an alias that is either a one-line text file or a symlink into a
/// version directory.
fn read_alias(path: &Path) -> Option<String> {
    if is_symlink(path) {
        let target = std::fs::read_link(path).ok()?;
        return target
            .components()
            .rev()
            .filter_map(|c| c.as_os_str().to_str())
            .find(|c| version::looks_like_version(c))
            .map(String::from);
    }
    read_first_line(path)
}

/// Find `tool`'s version in a `.tool-versions` file.
pub fn tool_versions_entry(content: &str, tool: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let mut parts = line.split_whitespace();
            (parts.next()? == tool).then(|| parts.next().map(String::from))?
        })
}

fn volta_runtime(content: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(content).ok()?;
    json.get("node")?
        .get("runtime")?
        .as_str()
        .map(String::from)
}

/// Find `tool`'s version under the `[tools]` table of a mise config.
fn mise_tool_entry(content: &str, tool: &str) -> Option<String> {
    let mut in_tools = false;
    for line in content.lines().map(str::trim) {
        if line.starts_with('[') {
            in_tools = line == "[tools]";
            continue;
        }
        if !in_tools || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim().trim_matches('"') == tool {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            return (!value.is_empty()).then(|| value.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fake_node(root: &Path) {
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(root.join("bin/node"), "#!/bin/sh\n").unwrap();
    }

    fn env_for(home: &Path) -> HostEnv {
        HostEnv::new(Platform::Linux, home, home)
    }

    #[test]
    fn definitions_are_unique() {
        for (i, def) in MANAGER_DEFS.iter().enumerate() {
            assert!(
                MANAGER_DEFS[i + 1..].iter().all(|d| d.name != def.name),
                "duplicate {}",
                def.name
            );
        }
        assert!(find_def("volta").is_some());
        assert!(find_def("homebrew").is_none());
    }

    #[test]
    fn nvm_absent_when_root_missing() {
        let temp = TempDir::new().unwrap();
        let detector = ManagedDetector::new(find_def("nvm").unwrap());
        assert!(detector.detect(&env_for(temp.path())).unwrap().is_none());
    }

    #[test]
    fn nvm_detects_versions_and_default_alias() {
        let temp = TempDir::new().unwrap();
        let nvm = temp.path().join(".nvm");
        fake_node(&nvm.join("versions/node/v20.11.0"));
        fake_node(&nvm.join("versions/node/v18.19.0"));
        fs::create_dir_all(nvm.join("versions/node/not-a-version")).unwrap();
        fs::create_dir_all(nvm.join("alias")).unwrap();
        fs::write(nvm.join("alias/default"), "v20.11.0\n").unwrap();

        let detector = ManagedDetector::new(find_def("nvm").unwrap());
        let result = detector.detect(&env_for(temp.path())).unwrap().unwrap();

        assert_eq!(result.base_dir, nvm);
        assert_eq!(result.installations.len(), 2);
        assert_eq!(result.installations[0].version, "18.19.0");
        assert_eq!(result.installations[0].manager, "nvm");
        assert!(result.installations[0].size > 0);
        assert_eq!(result.default_version.as_deref(), Some("20.11.0"));
        assert_eq!(result.env_var.as_deref(), Some("NVM_DIR"));
        assert_eq!(result.env_var_set, Some(false));
    }

    #[test]
    fn env_var_relocates_root() {
        let temp = TempDir::new().unwrap();
        let custom = temp.path().join("opt/fnm");
        fake_node(&custom.join("node-versions/v22.1.0/installation"));

        let env = env_for(temp.path()).with_var("FNM_DIR", custom.to_string_lossy());
        let detector = ManagedDetector::new(find_def("fnm").unwrap());
        let result = detector.detect(&env).unwrap().unwrap();

        assert_eq!(result.installations.len(), 1);
        assert_eq!(result.installations[0].version, "22.1.0");
        assert!(result.installations[0].path.ends_with("installation"));
        assert_eq!(result.env_var_set, Some(true));
    }

    #[test]
    fn env_var_pointing_nowhere_means_absent() {
        let temp = TempDir::new().unwrap();
        fake_node(&temp.path().join(".volta/tools/image/node/20.0.0"));
        let env = env_for(temp.path()).with_var("VOLTA_HOME", "/nonexistent/volta");
        let detector = ManagedDetector::new(find_def("volta").unwrap());
        assert!(detector.detect(&env).unwrap().is_none());
    }

    #[test]
    fn n_uses_prefix_subdir() {
        let temp = TempDir::new().unwrap();
        fake_node(&temp.path().join("prefix/n/versions/node/21.6.0"));
        let env = env_for(temp.path()).with_var("N_PREFIX", temp.path().join("prefix").to_string_lossy());
        let detector = ManagedDetector::new(find_def("n").unwrap());
        let result = detector.detect(&env).unwrap().unwrap();
        assert_eq!(result.installations[0].version, "21.6.0");
    }

    #[test]
    fn nvs_records_architecture() {
        let temp = TempDir::new().unwrap();
        fake_node(&temp.path().join(".nvs/node/20.0.0/x64"));
        fake_node(&temp.path().join(".nvs/node/20.0.0/arm64"));
        let detector = ManagedDetector::new(find_def("nvs").unwrap());
        let result = detector.detect(&env_for(temp.path())).unwrap().unwrap();

        let arches: Vec<_> = result
            .installations
            .iter()
            .filter_map(|i| i.arch.as_deref())
            .collect();
        assert_eq!(arches, vec!["arm64", "x64"]);
    }

    #[test]
    fn volta_default_from_platform_json() {
        let temp = TempDir::new().unwrap();
        let volta = temp.path().join(".volta");
        fake_node(&volta.join("tools/image/node/20.10.0"));
        fs::create_dir_all(volta.join("tools/user")).unwrap();
        fs::write(
            volta.join("tools/user/platform.json"),
            r#"{"node":{"runtime":"20.10.0","npm":null}}"#,
        )
        .unwrap();
        let detector = ManagedDetector::new(find_def("volta").unwrap());
        let result = detector.detect(&env_for(temp.path())).unwrap().unwrap();
        assert_eq!(result.default_version.as_deref(), Some("20.10.0"));
    }

    #[test]
    fn asdf_default_from_tool_versions() {
        let temp = TempDir::new().unwrap();
        fake_node(&temp.path().join(".asdf/installs/nodejs/18.20.0"));
        fs::write(temp.path().join(".tool-versions"), "ruby 3.3.0\nnodejs 18.20.0\n").unwrap();
        let detector = ManagedDetector::new(find_def("asdf").unwrap());
        let result = detector.detect(&env_for(temp.path())).unwrap().unwrap();
        assert_eq!(result.default_version.as_deref(), Some("18.20.0"));
    }

    #[test]
    fn mise_tool_entry_reads_tools_table() {
        let config = "[settings]\nnode = \"ignored\"\n\n[tools]\npython = \"3.12\"\nnode = \"22\"\n";
        assert_eq!(mise_tool_entry(config, "node"), Some("22".to_string()));
        assert_eq!(mise_tool_entry("[tools]\n", "node"), None);
    }

    #[test]
    fn tool_versions_entry_ignores_comments() {
        let content = "# nodejs 16.0.0\nnodejs 20.1.0 18.0.0\n";
        assert_eq!(tool_versions_entry(content, "nodejs"), Some("20.1.0".to_string()));
        assert_eq!(tool_versions_entry(content, "python"), None);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_alias_resolves_to_version() {
        let temp = TempDir::new().unwrap();
        let fnm = temp.path().join(".fnm");
        let install = fnm.join("node-versions/v20.5.1/installation");
        fake_node(&install);
        fs::create_dir_all(fnm.join("aliases")).unwrap();
        std::os::unix::fs::symlink(&install, fnm.join("aliases/default")).unwrap();

        let detector = ManagedDetector::new(find_def("fnm").unwrap());
        let result = detector.detect(&env_for(temp.path())).unwrap().unwrap();
        assert_eq!(result.default_version.as_deref(), Some("20.5.1"));
    }
}

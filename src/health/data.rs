//! The consolidated snapshot rules are evaluated against.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::aggregate::DuplicateVersion;
use crate::net::{EolInfo, SecurityInfo};
use crate::platform::Platform;
use crate::probes::{
    CorepackStatus, ExtendedChecks, GlobalPackages, PackageManagers, PathNode, PermissionReport,
    PortProcess, ProjectInfo, RegistryInfo, RegistryStatus, ShellScan,
};

/// Host facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub platform: Platform,
    /// Host CPU architecture in runtime terms (`x64`, `arm64`).
    pub arch: String,
    pub is_ci: bool,
    pub running_as_root: bool,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            platform: Platform::current(),
            arch: host_arch().to_string(),
            is_ci: false,
            running_as_root: false,
        }
    }
}

/// Host architecture using the runtime's naming.
pub fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "ia32",
        other => other,
    }
}

/// One detected manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerInfo {
    pub name: String,
    pub display_name: String,
    pub base_dir: PathBuf,
    /// Installed versions, newest first.
    pub versions: Vec<String>,
    pub total_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_var_set: Option<bool>,
    /// The manager misbehaves when `env_var` is unset.
    pub env_required: bool,
}

/// EOL and security status of one installed copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledVersionStatus {
    pub manager: String,
    pub version: String,
    pub eol: EolInfo,
    pub security: SecurityInfo,
}

/// Availability of the release feeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedStatus {
    pub schedule_available: bool,
    pub dist_index_available: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Runtime-affecting environment variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvVarFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_options: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm_config_prefix: Option<String>,
}

/// Everything the rules need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthData {
    pub system: SystemInfo,
    /// Runtimes on PATH in search order; entry 0 is active.
    pub nodes_in_path: Vec<PathNode>,
    /// `process.arch` reported by the active runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_arch: Option<String>,
    pub managers: Vec<ManagerInfo>,
    /// Managers owning a runtime on PATH.
    pub active_managers: Vec<String>,
    pub registry: RegistryStatus,
    pub registry_config: RegistryInfo,
    pub feeds: FeedStatus,
    pub installed: Vec<InstalledVersionStatus>,
    /// `None` when the port scan was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<PortProcess>>,
    /// `None` when the shell scan was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<ShellScan>,
    pub package_managers: PackageManagers,
    pub duplicates: Vec<DuplicateVersion>,
    pub env_vars: EnvVarFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_packages: Option<GlobalPackages>,
    pub permissions: PermissionReport,
    pub corepack: CorepackStatus,
    pub project: ProjectInfo,
    pub extended: ExtendedChecks,
}

impl HealthData {
    /// The runtime a shell would run.
    pub fn active_node(&self) -> Option<&PathNode> {
        self.nodes_in_path.first()
    }

    /// Version of the active runtime.
    pub fn active_version(&self) -> Option<&str> {
        self.active_node().and_then(|n| n.version.as_deref())
    }

    pub fn manager(&self, name: &str) -> Option<&ManagerInfo> {
        self.managers.iter().find(|m| m.name == name)
    }
}

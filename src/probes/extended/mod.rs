//! Extended heuristics.
//!
//! Each submodule pairs a pure check function with (where it needs one) a
//! small probe, so the checks can be tested against fixtures.

pub mod cache_health;
pub mod engines;
pub mod global_root;
pub mod ide;
pub mod native_build;
pub mod npm_prefix;
pub mod shell_startup;
pub mod stale_native;
pub mod symlink;
pub mod version_files;

use serde::{Deserialize, Serialize};

pub use cache_health::CacheHealth;
pub use engines::EnginesCompliance;
pub use global_root::GlobalRootCheck;
pub use ide::IdeIntegration;
pub use native_build::NativeBuildTools;
pub use npm_prefix::NpmPrefixCheck;
pub use shell_startup::ShellStartup;
pub use stale_native::StaleNativeDeps;
pub use symlink::SymlinkCapability;
pub use version_files::VersionFileConflicts;

/// Results of all extended heuristics. `None` means the check did not run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedChecks {
    pub npm_prefix: NpmPrefixCheck,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_startup: Option<ShellStartup>,
    pub version_files: VersionFileConflicts,
    pub engines: EnginesCompliance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_build: Option<NativeBuildTools>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheHealth>,
    pub global_root: GlobalRootCheck,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symlinks: Option<SymlinkCapability>,
    pub stale_native: StaleNativeDeps,
    pub ide: IdeIntegration,
}

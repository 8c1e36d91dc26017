//! Installation detectors.
//!
//! A [`Detector`] reports the runtime installations owned by one
//! installation manager (nvm, fnm, Volta, Homebrew, ...). Detectors are
//! collected in a [`DetectorRegistry`], which validates them at
//! registration and runs them with per-detector failure isolation.
//!
//! # Modules
//!
//! - [`registry`] - Registration, validation, scanning and aggregation
//! - [`managed`] - Table-driven detectors for directory-per-version managers
//! - [`homebrew`] - Homebrew `Cellar` formulae
//! - [`system`] - OS package locations
//! - [`analysis`] - Analysis-only sentinels (`path`, `project`)
//!
//! # Example
//!
//! ```no_run
//! use node_doctor::detectors::DetectorRegistry;
//! use node_doctor::platform::HostEnv;
//!
//! let registry = DetectorRegistry::with_builtins().unwrap();
//! let results = registry.scan_all(&HostEnv::from_process());
//! for (name, result) in results.iter() {
//!     let count = result.map(|r| r.installations.len()).unwrap_or(0);
//!     println!("{}: {} installation(s)", name, count);
//! }
//! ```

pub mod analysis;
pub mod homebrew;
pub mod managed;
pub mod registry;
pub mod system;

pub use registry::{DetectorRegistry, ManagerSummary, ScanResults};

use crate::platform::{HostEnv, Platform};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One on-disk runtime instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installation {
    /// Normalized version string (no leading `v`).
    pub version: String,
    /// Installation root directory.
    pub path: PathBuf,
    /// Path to the runtime executable.
    pub executable: PathBuf,
    /// Size of the installation in bytes.
    pub size: u64,
    /// Version reported by the executable itself, when it was run.
    pub verified_version: Option<String>,
    /// Name of the owning manager.
    pub manager: String,
    /// CPU architecture, when the layout encodes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// Homebrew formula name (`node`, `node@18`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// Canonical path of the executable when it differs from `executable`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_path: Option<PathBuf>,
}

impl Installation {
    /// Create an installation with the required fields.
    pub fn new(
        manager: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<PathBuf>,
        executable: impl Into<PathBuf>,
    ) -> Self {
        Self {
            version: version.into(),
            path: path.into(),
            executable: executable.into(),
            size: 0,
            verified_version: None,
            manager: manager.into(),
            arch: None,
            formula: None,
            real_path: None,
        }
    }

    /// Set the size in bytes.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Set the verified version.
    pub fn with_verified_version(mut self, version: impl Into<String>) -> Self {
        self.verified_version = Some(version.into());
        self
    }

    /// Set the architecture.
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// Set the Homebrew formula.
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// Set the canonical executable path.
    pub fn with_real_path(mut self, real_path: impl Into<PathBuf>) -> Self {
        self.real_path = Some(real_path.into());
        self
    }
}

/// One manager's snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorResult {
    /// Manager root; used to attribute PATH executables to this manager.
    pub base_dir: PathBuf,
    /// Directory holding one sub-directory per version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions_dir: Option<PathBuf>,
    /// Installations found.
    pub installations: Vec<Installation>,
    /// Version selected as the manager's default, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_version: Option<String>,
    /// Environment variable the manager relies on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
    /// Whether `env_var` is set in the current environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_var_set: Option<bool>,
}

impl DetectorResult {
    /// Create a result rooted at `base_dir` with no installations.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            versions_dir: None,
            installations: Vec::new(),
            default_version: None,
            env_var: None,
            env_var_set: None,
        }
    }

    /// Total bytes across all installations.
    pub fn total_size(&self) -> u64 {
        self.installations.iter().map(|i| i.size).sum()
    }
}

/// A platform-scoped plugin reporting installations for one manager.
///
/// `detect` returns `Ok(None)` when the manager is not present. Errors and
/// panics are isolated by [`DetectorRegistry::scan_all`].
pub trait Detector: Send + Sync {
    /// Unique identifier (`nvm`, `fnm`).
    fn name(&self) -> &str;

    /// Human-readable name (`Node Version Manager`).
    fn display_name(&self) -> &str;

    /// Short icon shown next to the manager in listings.
    fn icon(&self) -> &str;

    /// Platforms this detector runs on.
    fn platforms(&self) -> &[Platform];

    /// Whether installations may be removed by deleting their directory.
    fn can_delete(&self) -> bool;

    /// Analysis-only detectors describe the environment rather than
    /// on-disk versions and are left out of summaries and duplicates.
    fn analysis_only(&self) -> bool {
        false
    }

    /// Inspect the host and report this manager's installations.
    fn detect(&self, env: &HostEnv) -> anyhow::Result<Option<DetectorResult>>;
}

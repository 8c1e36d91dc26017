//! Platform tags and the host environment snapshot.
//!
//! Detectors and probes never read `std::env` directly. They receive a
//! [`HostEnv`], which lets tests point them at a temporary home directory
//! and a hand-built set of environment variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Operating system family a detector can run on.
///
/// Serialized with the tags used by Node.js itself (`process.platform`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Darwin,
    Linux,
    Win32,
}

impl Platform {
    /// All platform tags.
    pub const ALL: [Platform; 3] = [Platform::Darwin, Platform::Linux, Platform::Win32];

    /// Unix-like platforms.
    pub const UNIX: [Platform; 2] = [Platform::Darwin, Platform::Linux];

    /// Detect the current platform.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Darwin
        } else if cfg!(target_os = "windows") {
            Platform::Win32
        } else {
            Platform::Linux
        }
    }

    /// The runtime executable name on this platform.
    pub fn node_executable(self) -> &'static str {
        match self {
            Platform::Win32 => "node.exe",
            _ => "node",
        }
    }

    /// Relative path of the runtime binary inside an installation root.
    pub fn node_bin_subpath(self) -> &'static str {
        match self {
            Platform::Win32 => "node.exe",
            _ => "bin/node",
        }
    }

    pub fn is_windows(self) -> bool {
        self == Platform::Win32
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Darwin => write!(f, "darwin"),
            Platform::Linux => write!(f, "linux"),
            Platform::Win32 => write!(f, "win32"),
        }
    }
}

/// Snapshot of the host: platform, home directory, working directory and
/// environment variables.
#[derive(Debug, Clone)]
pub struct HostEnv {
    /// Current platform.
    pub platform: Platform,
    /// The user's home directory.
    pub home: PathBuf,
    /// Working directory used for project-level checks.
    pub cwd: PathBuf,
    vars: HashMap<String, String>,
}

impl HostEnv {
    /// Capture the real process environment.
    pub fn from_process() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        let cwd = std::env::current_dir().unwrap_or_else(|_| home.clone());
        Self {
            platform: Platform::current(),
            home,
            cwd,
            vars: std::env::vars().collect(),
        }
    }

    /// Build an environment with no variables set.
    pub fn new(platform: Platform, home: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            home: home.into(),
            cwd: cwd.into(),
            vars: HashMap::new(),
        }
    }

    /// Set a variable (builder style).
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Look up a variable. Empty values count as unset.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Whether a variable is set to a non-empty value.
    pub fn has_var(&self, key: &str) -> bool {
        self.var(key).is_some()
    }

    /// Look up a variable and interpret it as a path.
    pub fn var_path(&self, key: &str) -> Option<PathBuf> {
        self.var(key).map(PathBuf::from)
    }

    /// PATH split into directories, in search order, duplicates removed.
    pub fn path_entries(&self) -> Vec<PathBuf> {
        let raw = self.var("PATH").or_else(|| self.var("Path")).unwrap_or("");
        let mut entries: Vec<PathBuf> = Vec::new();
        for dir in std::env::split_paths(raw) {
            if dir.as_os_str().is_empty() || entries.contains(&dir) {
                continue;
            }
            entries.push(dir);
        }
        entries
    }

    /// Join a path relative to the home directory.
    pub fn home_join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.home.join(rel)
    }
}

/// Check if running in a CI environment.
pub fn is_ci(env: &HostEnv) -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS", "JENKINS_URL"]
        .iter()
        .any(|key| env.has_var(key))
}

/// Check if running as root/admin.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(windows)]
    {
        std::env::var("ADMIN").is_ok()
    }

    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}

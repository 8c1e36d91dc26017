//! Corepack availability and shim state.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::sys::command;
use crate::sys::fs::real_path;

/// Corepack status for the active runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorepackStatus {
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// `corepack enable` has installed yarn/pnpm shims next to the runtime.
    pub enabled: bool,
}

/// Whether `bin_dir` holds yarn or pnpm shims that resolve into corepack.
pub fn shims_enabled(bin_dir: &Path) -> bool {
    ["yarn", "pnpm", "yarn.cmd", "pnpm.cmd"].iter().any(|shim| {
        let path = bin_dir.join(shim);
        if !path.exists() {
            return false;
        }
        let resolved = real_path(&path).unwrap_or(path);
        if resolved.to_string_lossy().contains("corepack") {
            return true;
        }
        // Windows shims are small scripts that call into corepack
        std::fs::read_to_string(&resolved)
            .map(|s| s.len() < 4096 && s.contains("corepack"))
            .unwrap_or(false)
    })
}

/// Probe corepack for the runtime whose executable lives in `bin_dir`.
pub fn probe_corepack(bin_dir: Option<&Path>) -> CorepackStatus {
    let version = command::run_line("corepack", &["--version"]);
    CorepackStatus {
        available: version.is_some(),
        version,
        enabled: bin_dir.is_some_and(shims_enabled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn symlinked_shim_into_corepack_is_enabled() {
        let temp = TempDir::new().unwrap();
        let corepack = temp.path().join("lib/node_modules/corepack/dist");
        fs::create_dir_all(&corepack).unwrap();
        fs::write(corepack.join("yarn.js"), "").unwrap();
        let bin = temp.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        std::os::unix::fs::symlink(corepack.join("yarn.js"), bin.join("yarn")).unwrap();

        assert!(shims_enabled(&bin));
    }

    #[test]
    fn unrelated_yarn_is_not_corepack() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("yarn"), "#!/bin/sh\nexec /opt/yarn/bin/yarn \"$@\"\n").unwrap();
        assert!(!shims_enabled(temp.path()));
    }

    #[test]
    fn missing_bin_dir_is_not_enabled() {
        let temp = TempDir::new().unwrap();
        assert!(!shims_enabled(&temp.path().join("nope")));
    }
}

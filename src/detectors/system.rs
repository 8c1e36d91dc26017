//! Runtimes installed by the operating system's package manager or an
//! official installer into a standard location.

use std::path::{Path, PathBuf};

use super::{Detector, DetectorResult, Installation};
use crate::platform::{HostEnv, Platform};
use crate::sys::command;
use crate::sys::fs::{is_within, real_path};
use crate::version;

/// Standard binary directories on unix hosts.
pub const UNIX_SYSTEM_DIRS: &[&str] = &[
    "/usr/bin",
    "/usr/local/bin",
    "/bin",
    "/opt/local/bin",
    "/snap/bin",
];

/// Standard install directories on Windows hosts.
pub const WINDOWS_SYSTEM_DIRS: &[&str] = &[
    "C:\\Program Files\\nodejs",
    "C:\\Program Files (x86)\\nodejs",
];

/// Prefixes a resolved system executable must stay under.
const UNIX_SYSTEM_ROOTS: &[&str] = &["/usr", "/bin", "/opt/local", "/snap"];

/// Standard directories for `platform`.
pub fn system_dirs(platform: Platform) -> &'static [&'static str] {
    if platform.is_windows() {
        WINDOWS_SYSTEM_DIRS
    } else {
        UNIX_SYSTEM_DIRS
    }
}

/// Whether `dir` is one of the OS-standard binary directories.
pub fn is_system_dir(platform: Platform, dir: &Path) -> bool {
    system_dirs(platform).iter().any(|d| dir == Path::new(d))
}

/// Detector for OS-level runtimes.
#[derive(Default)]
pub struct SystemDetector {
    locations: Option<Vec<PathBuf>>,
}

impl SystemDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `locations` instead of the standard directories.
    pub fn with_locations(locations: Vec<PathBuf>) -> Self {
        Self {
            locations: Some(locations),
        }
    }

    fn candidate_dirs(&self, platform: Platform) -> Vec<PathBuf> {
        match &self.locations {
            Some(dirs) => dirs.clone(),
            None => system_dirs(platform).iter().map(PathBuf::from).collect(),
        }
    }

    /// A symlink into a manager's tree belongs to that manager, not the OS.
    fn stays_in_system(&self, platform: Platform, dir: &Path, resolved: &Path) -> bool {
        if resolved.parent().is_some_and(|p| is_within(p, dir)) {
            return true;
        }
        if platform.is_windows() {
            return WINDOWS_SYSTEM_DIRS.iter().any(|d| is_within(resolved, Path::new(d)));
        }
        let in_root = UNIX_SYSTEM_ROOTS
            .iter()
            .any(|root| resolved.starts_with(root));
        // /usr/local is shared with Homebrew and n
        in_root
            && !resolved.starts_with("/usr/local/Cellar")
            && !resolved.starts_with("/usr/local/n")
    }
}

impl Detector for SystemDetector {
    fn name(&self) -> &str {
        "system"
    }

    fn display_name(&self) -> &str {
        "System"
    }

    fn icon(&self) -> &str {
        "⚙"
    }

    fn platforms(&self) -> &[Platform] {
        &Platform::ALL
    }

    fn can_delete(&self) -> bool {
        false
    }

    fn detect(&self, env: &HostEnv) -> anyhow::Result<Option<DetectorResult>> {
        let mut result: Option<DetectorResult> = None;
        let mut seen: Vec<PathBuf> = Vec::new();

        for dir in self.candidate_dirs(env.platform) {
            let executable = dir.join(env.platform.node_executable());
            if !executable.is_file() {
                continue;
            }
            let resolved = real_path(&executable).unwrap_or_else(|| executable.clone());
            if !self.stays_in_system(env.platform, &dir, &resolved) {
                tracing::debug!(
                    "Skipping {} (resolves to {})",
                    executable.display(),
                    resolved.display()
                );
                continue;
            }
            if seen.contains(&resolved) {
                continue;
            }
            seen.push(resolved.clone());

            let exe_str = executable.to_string_lossy().to_string();
            let Some(reported) = command::run_line(&exe_str, &["--version"]) else {
                tracing::debug!("{} did not report a version", exe_str);
                continue;
            };
            let reported = version::normalize(&reported);
            let size = std::fs::metadata(&resolved).map(|m| m.len()).unwrap_or(0);

            let mut inst = Installation::new("system", reported.clone(), &dir, &executable)
                .with_size(size)
                .with_verified_version(reported);
            if resolved != executable {
                inst = inst.with_real_path(resolved);
            }

            result
                .get_or_insert_with(|| DetectorResult::new(&dir))
                .installations
                .push(inst);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_dirs_per_platform() {
        assert!(is_system_dir(Platform::Linux, Path::new("/usr/bin")));
        assert!(!is_system_dir(Platform::Linux, Path::new("/home/u/.nvm/bin")));
        assert!(is_system_dir(
            Platform::Win32,
            Path::new("C:\\Program Files\\nodejs")
        ));
    }

    #[test]
    fn empty_locations_mean_absent() {
        let temp = tempfile::TempDir::new().unwrap();
        let detector = SystemDetector::with_locations(vec![temp.path().to_path_buf()]);
        let env = HostEnv::new(Platform::Linux, temp.path(), temp.path());
        assert!(detector.detect(&env).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn verifies_version_by_running_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let node = temp.path().join("node");
        std::fs::write(&node, "#!/bin/sh\necho v20.11.1\n").unwrap();
        std::fs::set_permissions(&node, std::fs::Permissions::from_mode(0o755)).unwrap();

        let detector = SystemDetector::with_locations(vec![temp.path().to_path_buf()]);
        let env = HostEnv::new(Platform::Linux, temp.path(), temp.path());
        let result = detector.detect(&env).unwrap().unwrap();

        assert_eq!(result.installations.len(), 1);
        let inst = &result.installations[0];
        assert_eq!(inst.version, "20.11.1");
        assert_eq!(inst.verified_version.as_deref(), Some("20.11.1"));
        assert_eq!(inst.manager, "system");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_into_manager_tree_is_skipped() {
        let temp = tempfile::TempDir::new().unwrap();
        let manager_bin = temp.path().join("manager/bin");
        std::fs::create_dir_all(&manager_bin).unwrap();
        std::fs::write(manager_bin.join("node"), "x").unwrap();
        let sys_dir = temp.path().join("sys");
        std::fs::create_dir_all(&sys_dir).unwrap();
        std::os::unix::fs::symlink(manager_bin.join("node"), sys_dir.join("node")).unwrap();

        let detector = SystemDetector::with_locations(vec![sys_dir]);
        let env = HostEnv::new(Platform::Linux, temp.path(), temp.path());
        assert!(detector.detect(&env).unwrap().is_none());
    }
}

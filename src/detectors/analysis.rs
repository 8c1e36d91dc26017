//! Analysis-only sentinels.
//!
//! `path` reports the runtimes visible on PATH and `project` reports the
//! versions pinned in the working directory. Neither represents an on-disk
//! copy owned by a manager, so both are excluded from summaries and
//! duplicate detection.

use super::{Detector, DetectorResult, Installation};
use crate::platform::{HostEnv, Platform};
use crate::sys::command;
use crate::sys::fs::{read_first_line, real_path};
use crate::version;

/// Pin files read by the `project` sentinel, in priority order.
pub const PIN_FILES: &[&str] = &[".nvmrc", ".node-version"];

/// Runtimes found on PATH, in search order.
pub struct PathDetector;

impl Detector for PathDetector {
    fn name(&self) -> &str {
        "path"
    }

    fn display_name(&self) -> &str {
        "PATH"
    }

    fn icon(&self) -> &str {
        "→"
    }

    fn platforms(&self) -> &[Platform] {
        &Platform::ALL
    }

    fn can_delete(&self) -> bool {
        false
    }

    fn analysis_only(&self) -> bool {
        true
    }

    fn detect(&self, env: &HostEnv) -> anyhow::Result<Option<DetectorResult>> {
        let mut result: Option<DetectorResult> = None;
        for dir in env.path_entries() {
            let executable = dir.join(env.platform.node_executable());
            if !executable.is_file() {
                continue;
            }
            let exe_str = executable.to_string_lossy().to_string();
            let reported = command::run_line(&exe_str, &["--version"]);
            let version = reported
                .as_deref()
                .map(version::normalize)
                .unwrap_or_else(|| "unknown".to_string());

            let mut inst = Installation::new("path", version, &dir, &executable);
            if let Some(reported) = reported {
                inst = inst.with_verified_version(version::normalize(&reported));
            }
            if let Some(resolved) = real_path(&executable).filter(|r| *r != executable) {
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

/// Versions pinned by files in the working directory.
///
/// `executable` on these entries points at the pin file.
pub struct ProjectDetector;

impl Detector for ProjectDetector {
    fn name(&self) -> &str {
        "project"
    }

    fn display_name(&self) -> &str {
        "Project"
    }

    fn icon(&self) -> &str {
        "📌"
    }

    fn platforms(&self) -> &[Platform] {
        &Platform::ALL
    }

    fn can_delete(&self) -> bool {
        false
    }

    fn analysis_only(&self) -> bool {
        true
    }

    fn detect(&self, env: &HostEnv) -> anyhow::Result<Option<DetectorResult>> {
        let mut result = DetectorResult::new(&env.cwd);
        for file in PIN_FILES {
            let path = env.cwd.join(file);
            if let Some(pin) = read_first_line(&path) {
                result.installations.push(Installation::new(
                    "project",
                    version::normalize(&pin),
                    &env.cwd,
                    path,
                ));
            }
        }
        if result.installations.is_empty() {
            return Ok(None);
        }
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn project_reads_pin_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".nvmrc"), "v20.11.0\n").unwrap();
        fs::write(temp.path().join(".node-version"), "18\n").unwrap();

        let env = HostEnv::new(Platform::Linux, "/home/u", temp.path());
        let result = ProjectDetector.detect(&env).unwrap().unwrap();

        let versions: Vec<_> = result.installations.iter().map(|i| i.version.as_str()).collect();
        assert_eq!(versions, vec!["20.11.0", "18"]);
        assert!(ProjectDetector.analysis_only());
    }

    #[test]
    fn project_without_pins_is_absent() {
        let temp = TempDir::new().unwrap();
        let env = HostEnv::new(Platform::Linux, "/home/u", temp.path());
        assert!(ProjectDetector.detect(&env).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn path_lists_runtimes_in_search_order() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let mut dirs = Vec::new();
        for (name, version) in [("first", "v22.0.0"), ("second", "v18.0.0")] {
            let dir = temp.path().join(name);
            fs::create_dir_all(&dir).unwrap();
            let node = dir.join("node");
            fs::write(&node, format!("#!/bin/sh\necho {}\n", version)).unwrap();
            fs::set_permissions(&node, fs::Permissions::from_mode(0o755)).unwrap();
            dirs.push(dir.to_string_lossy().to_string());
        }

        let env = HostEnv::new(Platform::Linux, temp.path(), temp.path())
            .with_var("PATH", dirs.join(":"));
        let result = PathDetector.detect(&env).unwrap().unwrap();

        assert_eq!(result.installations.len(), 2);
        assert_eq!(result.installations[0].version, "22.0.0");
        assert_eq!(result.installations[1].version, "18.0.0");
    }
}

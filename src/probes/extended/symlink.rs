//! Whether the current user can create the links npm relies on.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::platform::Platform;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymlinkCapability {
    pub symlink: bool,
    /// Directory junctions (Windows only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub junction: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SymlinkCapability {
    /// npm can link packages with at least one mechanism.
    pub fn supported(&self) -> bool {
        self.symlink || self.junction == Some(true)
    }
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(not(any(unix, windows)))]
fn make_symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::other("symlinks unsupported"))
}

fn make_junction(target: &Path, link: &Path) -> bool {
    let (link, target) = (link.to_string_lossy(), target.to_string_lossy());
    crate::sys::command::run("cmd", &["/C", "mklink", "/J", &link, &target]).is_some()
}

/// Try the link mechanisms inside `scratch`, which is removed afterwards.
pub fn probe_links_in(platform: Platform, scratch: &Path) -> SymlinkCapability {
    let mut capability = SymlinkCapability::default();
    let target = scratch.join("target");
    if let Err(e) = fs::create_dir_all(&target) {
        capability.error = Some(e.to_string());
        return capability;
    }

    if platform.is_windows() {
        capability.junction = Some(make_junction(&target, &scratch.join("junction")));
    }
    match make_symlink(&target, &scratch.join("symlink")) {
        Ok(()) => capability.symlink = true,
        Err(e) => capability.error = Some(e.to_string()),
    }

    if let Err(e) = fs::remove_dir_all(scratch) {
        tracing::debug!("Failed to clean up {}: {}", scratch.display(), e);
    }
    capability
}

/// Probe in a uniquely named directory under the system temp dir.
pub fn probe_symlinks(platform: Platform) -> SymlinkCapability {
    let parent = match tempfile::Builder::new().prefix("node-doctor-links-").tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            return SymlinkCapability {
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
    };
    probe_links_in(platform, &parent.path().join("scratch"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn unix_symlinks_work_and_scratch_is_removed() {
        let temp = tempfile::TempDir::new().unwrap();
        let scratch = temp.path().join("scratch");
        let capability = probe_links_in(Platform::Linux, &scratch);
        assert!(capability.symlink);
        assert!(capability.junction.is_none());
        assert!(capability.supported());
        assert!(!scratch.exists());
    }

    #[cfg(unix)]
    #[test]
    fn concurrent_runs_use_separate_scratch_dirs() {
        let results: Vec<SymlinkCapability> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| probe_symlinks(Platform::Linux)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for capability in results {
            assert!(capability.symlink, "{:?}", capability.error);
            assert!(capability.error.is_none());
        }
    }

    #[test]
    fn junction_alone_is_enough() {
        let capability = SymlinkCapability {
            symlink: false,
            junction: Some(true),
            error: None,
        };
        assert!(capability.supported());
    }
}

//! Homebrew `Cellar` formulae (`node`, `node@18`, ...).
//!
//! Homebrew owns its kegs, so installations are reported but never marked
//! deletable.

use std::path::PathBuf;

use super::{Detector, DetectorResult, Installation};
use crate::platform::{HostEnv, Platform};
use crate::sys::fs::{dir_size, list_dirs};
use crate::version;

const DEFAULT_PREFIXES: &[&str] = &["/opt/homebrew", "/usr/local", "/home/linuxbrew/.linuxbrew"];

/// Detector for Homebrew-installed runtimes.
pub struct HomebrewDetector;

impl HomebrewDetector {
    fn prefixes(env: &HostEnv) -> Vec<PathBuf> {
        let mut prefixes: Vec<PathBuf> = env.var_path("HOMEBREW_PREFIX").into_iter().collect();
        for p in DEFAULT_PREFIXES {
            let p = PathBuf::from(p);
            if !prefixes.contains(&p) {
                prefixes.push(p);
            }
        }
        prefixes
    }
}

/// Whether a Cellar entry is a runtime formula (`node` or `node@<major>`).
pub fn is_node_formula(name: &str) -> bool {
    name == "node"
        || name
            .strip_prefix("node@")
            .is_some_and(|major| !major.is_empty() && major.chars().all(|c| c.is_ascii_digit()))
}

/// Strip a Homebrew revision suffix (`20.11.0_1` -> `20.11.0`).
pub fn strip_revision(keg: &str) -> &str {
    match keg.rsplit_once('_') {
        Some((version, rev)) if rev.chars().all(|c| c.is_ascii_digit()) => version,
        _ => keg,
    }
}

impl Detector for HomebrewDetector {
    fn name(&self) -> &str {
        "homebrew"
    }

    fn display_name(&self) -> &str {
        "Homebrew"
    }

    fn icon(&self) -> &str {
        "🍺"
    }

    fn platforms(&self) -> &[Platform] {
        &Platform::UNIX
    }

    fn can_delete(&self) -> bool {
        false
    }

    fn detect(&self, env: &HostEnv) -> anyhow::Result<Option<DetectorResult>> {
        let Some(cellar) = Self::prefixes(env)
            .into_iter()
            .map(|p| p.join("Cellar"))
            .find(|c| c.is_dir())
        else {
            return Ok(None);
        };

        let mut result = DetectorResult::new(&cellar);
        for formula_dir in list_dirs(&cellar) {
            let formula = formula_dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if !is_node_formula(&formula) {
                continue;
            }
            for keg in list_dirs(&formula_dir) {
                let Some(keg_name) = keg.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let executable = keg.join("bin/node");
                if !executable.is_file() {
                    continue;
                }
                let inst = Installation::new(
                    "homebrew",
                    version::normalize(strip_revision(keg_name)),
                    &keg,
                    executable,
                )
                .with_size(dir_size(&keg))
                .with_formula(formula.clone());
                result.installations.push(inst);
            }
        }

        if result.installations.is_empty() {
            tracing::debug!("Homebrew found at {} with no runtime formulae", cellar.display());
            return Ok(None);
        }
        result.env_var = Some("HOMEBREW_PREFIX".to_string());
        result.env_var_set = Some(env.has_var("HOMEBREW_PREFIX"));
        Ok(Some(result))
    }
}

//! Package-manager versions and npm configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::sys::command;
use crate::version;

/// Package managers probed with `--version`.
pub const PACKAGE_MANAGERS: &[&str] = &["npm", "yarn", "pnpm", "bun"];

/// An installed package manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolVersion {
    pub name: String,
    pub version: String,
}

/// Package-manager metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageManagers {
    /// Managers that answered `--version`.
    pub installed: Vec<ToolVersion>,
    /// `npm config get prefix`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm_prefix: Option<PathBuf>,
    /// `npm config get cache`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm_cache: Option<PathBuf>,
}

impl PackageManagers {
    /// Version of a manager, if installed.
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.installed
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.version.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.version_of(name).is_some()
    }
}

/// Treat npm's `undefined`/`null` answers as absent.
fn config_value(value: Option<String>) -> Option<PathBuf> {
    value
        .filter(|v| !v.is_empty() && v != "undefined" && v != "null")
        .map(PathBuf::from)
}

/// Query every package manager. Missing tools are simply omitted.
pub fn probe_package_managers() -> PackageManagers {
    let installed = PACKAGE_MANAGERS
        .iter()
        .filter_map(|name| {
            let reported = command::run_line(name, &["--version"])?;
            Some(ToolVersion {
                name: name.to_string(),
                version: version::normalize(&reported),
            })
        })
        .collect::<Vec<_>>();

    let has_npm = installed.iter().any(|t| t.name == "npm");
    let (npm_prefix, npm_cache) = if has_npm {
        (
            config_value(command::run_line("npm", &["config", "get", "prefix"])),
            config_value(command::run_line("npm", &["config", "get", "cache"])),
        )
    } else {
        (None, None)
    };

    PackageManagers {
        installed,
        npm_prefix,
        npm_cache,
    }
}

//! `engines` compliance for the running runtime and package managers.

use serde::{Deserialize, Serialize};

use crate::probes::package_managers::PackageManagers;
use crate::probes::project::ProjectInfo;
use crate::version::{self, RangeKind};

/// One `engines` entry checked against an installed version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineCheck {
    pub name: String,
    pub range: String,
    pub kind: RangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// `None` when the tool is missing or the range cannot be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfied: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnginesCompliance {
    pub checks: Vec<EngineCheck>,
}

impl EnginesCompliance {
    pub fn violations(&self) -> impl Iterator<Item = &EngineCheck> {
        self.checks.iter().filter(|c| c.satisfied == Some(false))
    }

    pub fn node(&self) -> Option<&EngineCheck> {
        self.checks.iter().find(|c| c.name == "node")
    }
}

/// Check every `engines` entry that names the runtime or a known package
/// manager.
pub fn check_engines(
    project: &ProjectInfo,
    running: Option<&str>,
    package_managers: &PackageManagers,
) -> EnginesCompliance {
    let checks = project
        .engines
        .iter()
        .filter_map(|(name, range)| {
            let installed = if name == "node" {
                running.map(String::from)
            } else if crate::probes::package_managers::PACKAGE_MANAGERS.contains(&name.as_str()) {
                package_managers.version_of(name).map(String::from)
            } else {
                return None;
            };
            let satisfied = installed
                .as_deref()
                .and_then(|v| version::satisfies(range, v));
            Some(EngineCheck {
                name: name.clone(),
                range: range.clone(),
                kind: version::range_kind(range),
                version: installed,
                satisfied,
            })
        })
        .collect();
    EnginesCompliance { checks }
}

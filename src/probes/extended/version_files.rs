//! Conflicts between the project's version pin files.

use serde::{Deserialize, Serialize};

use crate::probes::project::{PinSource, ProjectInfo, VersionPin};
use crate::version;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionFileConflicts {
    pub pins: Vec<VersionPin>,
    /// Human-readable description of each disagreement.
    pub conflicts: Vec<String>,
}

impl VersionFileConflicts {
    pub fn has_conflict(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Compare concrete pins with each other by major, and each concrete pin
/// against the `engines.node` range. Aliases such as `lts/*` are skipped.
pub fn check_version_files(project: &ProjectInfo) -> VersionFileConflicts {
    let concrete: Vec<&VersionPin> = project
        .pins
        .iter()
        .filter(|p| p.source != PinSource::Engines && version::looks_like_version(&p.value))
        .collect();

    let mut conflicts = Vec::new();
    if let Some(first) = concrete.first() {
        for other in &concrete[1..] {
            if version::major(&first.value) != version::major(&other.value) {
                conflicts.push(format!(
                    "{} ({}) and {} ({}) pin different majors",
                    first.source, first.value, other.source, other.value
                ));
            }
        }
    }

    if let Some(range) = project.engines_node() {
        for pin in &concrete {
            if version::satisfies(range, &pin.value) == Some(false) {
                conflicts.push(format!(
                    "{} ({}) does not satisfy engines.node ({})",
                    pin.source, pin.value, range
                ));
            }
        }
    }

    VersionFileConflicts {
        pins: project.pins.clone(),
        conflicts,
    }
}

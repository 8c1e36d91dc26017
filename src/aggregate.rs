//! Cross-manager aggregation and duplicate detection.
//!
//! Per-detector results are flattened into [`AggregatedInstallation`]s by
//! [`DetectorRegistry::all_installations`](crate::detectors::DetectorRegistry::all_installations).
//! This module holds the aggregated types plus the duplicate analysis that
//! runs over them.

use crate::detectors::Installation;
use crate::version;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// An installation tagged with its detector's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedInstallation {
    #[serde(flatten)]
    pub installation: Installation,
    pub detector_name: String,
    pub detector_display_name: String,
    pub detector_icon: String,
    pub can_delete: bool,
}

/// Options for flattening scan results.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateOptions {
    /// Include managers whose installations cannot be deleted directly
    /// (Homebrew, system packages, analysis-only sentinels).
    pub include_non_deletable: bool,
}

/// Same version installed under two or more managers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateVersion {
    /// Normalized version string.
    pub version: String,
    /// Managers holding a copy, in first-seen order.
    pub managers: Vec<String>,
    /// Combined size of every copy.
    pub total_size: u64,
}

impl DuplicateVersion {
    /// Approximate bytes freed by keeping a single copy.
    ///
    /// Divides the combined size by the number of managers to estimate one
    /// copy; actual copies can differ in size.
    pub fn reclaimable_bytes(&self) -> u64 {
        if self.managers.is_empty() {
            return 0;
        }
        let per_copy = self.total_size / self.managers.len() as u64;
        self.total_size - per_copy
    }
}

/// Descending version order used for every installation listing.
pub fn by_version_desc(a: &Installation, b: &Installation) -> Ordering {
    version::compare(&b.version, &a.version)
}

/// Group installations by version and keep versions present under at
/// least two distinct managers, largest first.
pub fn find_duplicates<'a, I>(installations: I) -> Vec<DuplicateVersion>
where
    I: IntoIterator<Item = &'a Installation>,
{
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, DuplicateVersion> = HashMap::new();

    for inst in installations {
        let key = version::normalize(&inst.version);
        let entry = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            DuplicateVersion {
                version: key,
                managers: Vec::new(),
                total_size: 0,
            }
        });
        if !entry.managers.contains(&inst.manager) {
            entry.managers.push(inst.manager.clone());
        }
        entry.total_size += inst.size;
    }

    let mut duplicates: Vec<DuplicateVersion> = order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .filter(|group| group.managers.len() >= 2)
        .collect();
    duplicates.sort_by(|a, b| b.total_size.cmp(&a.total_size));
    duplicates
}

/// Total approximate reclaimable bytes across all duplicate sets.
pub fn total_reclaimable(duplicates: &[DuplicateVersion]) -> u64 {
    duplicates.iter().map(DuplicateVersion::reclaimable_bytes).sum()
}

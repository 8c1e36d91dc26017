//! Detector registry.
//!
//! The [`DetectorRegistry`] stores detectors in registration order, validates
//! them as they are added, and runs them against a [`HostEnv`]. It is built
//! once at startup and only read afterwards.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::analysis::{PathDetector, ProjectDetector};
use super::homebrew::HomebrewDetector;
use super::managed::{ManagedDetector, MANAGER_DEFS};
use super::system::SystemDetector;
use super::{Detector, DetectorResult, Installation};
use crate::aggregate::{by_version_desc, AggregateOptions, AggregatedInstallation};
use crate::error::{DoctorError, Result};
use crate::platform::{HostEnv, Platform};

/// Results of one scan: detector name to result, in registration order.
///
/// Serializes as a JSON object whose values are `null` for managers that
/// are not present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResults {
    entries: Vec<(String, Option<DetectorResult>)>,
}

impl ScanResults {
    /// Create an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a detector's result, replacing any earlier entry.
    pub fn insert(&mut self, name: impl Into<String>, result: Option<DetectorResult>) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = result;
        } else {
            self.entries.push((name, result));
        }
    }

    /// Whether the detector ran (even if it found nothing).
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// The detector's result, if it ran and found its manager.
    pub fn get(&self, name: &str) -> Option<&DetectorResult> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, r)| r.as_ref())
    }

    /// All entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&DetectorResult>)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r.as_ref()))
    }

    /// Entries whose manager was found.
    pub fn detected(&self) -> impl Iterator<Item = (&str, &DetectorResult)> {
        self.entries
            .iter()
            .filter_map(|(n, r)| r.as_ref().map(|r| (n.as_str(), r)))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no detector ran.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ScanResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

/// Per-manager installation count and size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerSummary {
    pub name: String,
    pub display_name: String,
    pub count: usize,
    pub total_size: u64,
}

/// Registry of installation detectors.
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Create a registry with all built-in detectors.
    ///
    /// Registration order matters: it is the tie-break when a PATH entry
    /// falls under more than one manager's base directory.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        for def in MANAGER_DEFS {
            registry.register(Box::new(ManagedDetector::new(def)))?;
        }
        registry.register(Box::new(HomebrewDetector))?;
        registry.register(Box::new(SystemDetector::new()))?;
        registry.register(Box::new(PathDetector))?;
        registry.register(Box::new(ProjectDetector))?;
        Ok(registry)
    }

    /// Validate and register a detector.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDetector` naming the offending field, or
    /// `DuplicateDetector` if the name is taken.
    pub fn register(&mut self, detector: Box<dyn Detector>) -> Result<()> {
        validate(detector.as_ref())?;
        if self.get(detector.name()).is_some() {
            return Err(DoctorError::DuplicateDetector {
                name: detector.name().to_string(),
            });
        }
        tracing::debug!("Registered detector {}", detector.name());
        self.detectors.push(detector);
        Ok(())
    }

    /// Get a detector by name.
    pub fn get(&self, name: &str) -> Option<&dyn Detector> {
        self.detectors
            .iter()
            .find(|d| d.name() == name)
            .map(|d| d.as_ref())
    }

    /// Iterate over detectors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Detector> {
        self.detectors.iter().map(|d| d.as_ref())
    }

    /// Detectors that run on `platform`.
    pub fn applicable(&self, platform: Platform) -> impl Iterator<Item = &dyn Detector> {
        self.iter().filter(move |d| d.platforms().contains(&platform))
    }

    /// Get the number of registered detectors.
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Run every detector applicable to the host platform.
    ///
    /// A detector that returns an error or panics is logged and recorded
    /// as `None`; the remaining detectors still run.
    pub fn scan_all(&self, env: &HostEnv) -> ScanResults {
        let mut results = ScanResults::new();
        for detector in self.applicable(env.platform) {
            let name = detector.name();
            let outcome = catch_unwind(AssertUnwindSafe(|| detector.detect(env)));
            let result = match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    tracing::warn!("Detector {} failed: {:#}", name, e);
                    None
                }
                Err(_) => {
                    tracing::warn!("Detector {} panicked", name);
                    None
                }
            };
            tracing::debug!(
                "Detector {}: {}",
                name,
                result
                    .as_ref()
                    .map(|r| format!("{} installation(s)", r.installations.len()))
                    .unwrap_or_else(|| "not present".to_string())
            );
            results.insert(name, result);
        }
        results
    }

    /// Flatten scan results into one list, newest version first.
    ///
    /// Non-deletable managers are dropped unless
    /// `options.include_non_deletable` is set. Results for names that are
    /// not registered are ignored.
    pub fn all_installations(
        &self,
        results: &ScanResults,
        options: AggregateOptions,
    ) -> Vec<AggregatedInstallation> {
        let mut all: Vec<AggregatedInstallation> = results
            .detected()
            .filter_map(|(name, result)| self.get(name).map(|d| (d, result)))
            .filter(|(d, _)| options.include_non_deletable || d.can_delete())
            .flat_map(|(d, result)| {
                result.installations.iter().map(move |inst| AggregatedInstallation {
                    installation: inst.clone(),
                    detector_name: d.name().to_string(),
                    detector_display_name: d.display_name().to_string(),
                    detector_icon: d.icon().to_string(),
                    can_delete: d.can_delete(),
                })
            })
            .collect();
        all.sort_by(|a, b| by_version_desc(&a.installation, &b.installation));
        all
    }

    /// Installations that represent real on-disk versions (analysis-only
    /// detectors excluded), regardless of deletability.
    pub fn managed_installations<'a>(&self, results: &'a ScanResults) -> Vec<&'a Installation> {
        results
            .detected()
            .filter(|(name, _)| !self.is_analysis_only(name))
            .flat_map(|(_, result)| result.installations.iter())
            .collect()
    }

    /// Per-manager counts and sizes, excluding analysis-only detectors.
    pub fn summary(&self, results: &ScanResults) -> Vec<ManagerSummary> {
        results
            .detected()
            .filter(|(name, _)| !self.is_analysis_only(name))
            .map(|(name, result)| ManagerSummary {
                name: name.to_string(),
                display_name: self
                    .get(name)
                    .map(|d| d.display_name().to_string())
                    .unwrap_or_else(|| name.to_string()),
                count: result.installations.len(),
                total_size: result.total_size(),
            })
            .collect()
    }

    /// Whether `name` is an analysis-only sentinel.
    pub fn is_analysis_only(&self, name: &str) -> bool {
        self.get(name).is_some_and(|d| d.analysis_only())
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(detector: &dyn Detector) -> Result<()> {
    let invalid = |field: &'static str, reason: &str| DoctorError::InvalidDetector {
        detector: detector.name().to_string(),
        field,
        reason: reason.to_string(),
    };

    if detector.name().trim().is_empty() {
        return Err(invalid("name", "must not be empty"));
    }
    if detector.display_name().trim().is_empty() {
        return Err(invalid("display_name", "must not be empty"));
    }
    if detector.platforms().is_empty() {
        return Err(invalid("platforms", "must list at least one platform"));
    }
    Ok(())
}

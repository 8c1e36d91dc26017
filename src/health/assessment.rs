//! Assessment summarizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::check::{Check, CheckStatus};
use super::collector::{CollectOptions, HealthCollector};
use super::data::HealthData;
use super::rule::RuleSet;
use crate::detectors::{DetectorRegistry, ScanResults};

/// Check counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
}

/// The timestamped result of a health run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub timestamp: DateTime<Utc>,
    pub overall_status: CheckStatus,
    /// `1` when any check failed, else `0`.
    pub exit_code: i32,
    pub checks: Vec<Check>,
    pub summary: Summary,
    pub data: HealthData,
}

impl Assessment {
    pub fn failed(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| c.status == CheckStatus::Fail)
    }
}

/// Reduce checks to counts, overall status and exit code.
pub fn summarize(checks: Vec<Check>, data: HealthData, timestamp: DateTime<Utc>) -> Assessment {
    let mut summary = Summary {
        total: checks.len(),
        ..Default::default()
    };
    for check in &checks {
        match check.status {
            CheckStatus::Pass => summary.passed += 1,
            CheckStatus::Warn => summary.warnings += 1,
            CheckStatus::Fail => summary.failed += 1,
        }
    }

    let overall_status = if summary.failed > 0 {
        CheckStatus::Fail
    } else if summary.warnings > 0 {
        CheckStatus::Warn
    } else {
        CheckStatus::Pass
    };

    Assessment {
        timestamp,
        overall_status,
        exit_code: if summary.failed > 0 { 1 } else { 0 },
        checks,
        summary,
        data,
    }
}

/// Collect a snapshot, evaluate `rules` against it and summarize.
pub fn run_assessment(
    collector: &HealthCollector,
    registry: &DetectorRegistry,
    results: &ScanResults,
    rules: &RuleSet,
    options: CollectOptions,
    timestamp: DateTime<Utc>,
) -> Assessment {
    let data = collector.collect(registry, results, options);
    let checks = rules.evaluate(&data);
    tracing::debug!("Evaluated {} checks", checks.len());
    summarize(checks, data, timestamp)
}

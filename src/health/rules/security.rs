//! End-of-life and security-release rules.
//!
//! The active runtime is judged strictly. Inactive installed copies only
//! ever warn.

use serde_json::json;

use crate::health::{Check, CheckCategory, CheckStatus, HealthData, HealthRule};
use crate::net::{EolInfo, EolStatus};

use super::display_version;

fn describe_eol(version: &str, eol: Option<&EolInfo>) -> (CheckStatus, String) {
    let label = display_version(version);
    let Some(eol) = eol else {
        return (
            CheckStatus::Warn,
            format!("Could not determine support status of Node {}", label),
        );
    };
    let end = eol.end.map(|d| d.to_string()).unwrap_or_else(|| "an unknown date".to_string());
    match eol.status {
        EolStatus::Eol => (
            CheckStatus::Fail,
            format!("Node {} reached end-of-life on {}", label, end),
        ),
        EolStatus::Maintenance => (
            CheckStatus::Warn,
            format!("Node {} is in maintenance; end-of-life on {}", label, end),
        ),
        EolStatus::Active => (
            CheckStatus::Pass,
            format!("Node {} is supported until {}", label, end),
        ),
        EolStatus::Unknown => (
            CheckStatus::Warn,
            format!("Could not determine support status of Node {}", label),
        ),
    }
}

/// Support status of the active runtime.
pub struct NodeEolRule;

impl HealthRule for NodeEolRule {
    fn id(&self) -> &'static str {
        "node-eol"
    }

    fn name(&self) -> &'static str {
        "Node.js end-of-life"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Security
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let node = data.active_node()?;
        let version = node.version.as_deref().unwrap_or("unknown");
        let (status, mut message) = describe_eol(version, node.eol.as_ref());
        if !data.feeds.schedule_available {
            message.push_str(" (release schedule unavailable)");
        }

        let check = self.check(status, message);
        Some(match status {
            CheckStatus::Fail => check.with_hint("Upgrade to a supported LTS release"),
            CheckStatus::Warn if node.eol.as_ref().is_some_and(|e| e.status == EolStatus::Maintenance) => {
                check.with_hint("Plan an upgrade to the current LTS line")
            }
            _ => check,
        })
    }
}

/// Installed copies past end-of-life.
pub struct InstalledEolRule;

impl HealthRule for InstalledEolRule {
    fn id(&self) -> &'static str {
        "installed-eol"
    }

    fn name(&self) -> &'static str {
        "Installed versions end-of-life"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Security
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        if data.installed.is_empty() {
            return None;
        }
        if !data.feeds.schedule_available {
            return Some(self.check(
                CheckStatus::Warn,
                "Release schedule unavailable; installed versions not checked".to_string(),
            ));
        }

        let expired: Vec<String> = data
            .installed
            .iter()
            .filter(|i| i.eol.status == EolStatus::Eol)
            .map(|i| format!("{} {}", i.manager, display_version(&i.version)))
            .collect();

        if expired.is_empty() {
            return Some(self.check(
                CheckStatus::Pass,
                format!("None of the {} installed versions is past end-of-life", data.installed.len()),
            ));
        }
        Some(
            self.check(
                CheckStatus::Warn,
                format!("{} installed version(s) past end-of-life: {}", expired.len(), expired.join(", ")),
            )
            .with_hint("Uninstall versions you no longer need")
            .with_details(json!({ "versions": expired })),
        )
    }
}

/// Security releases newer than the active runtime.
pub struct NodeSecurityRule;

impl HealthRule for NodeSecurityRule {
    fn id(&self) -> &'static str {
        "node-security"
    }

    fn name(&self) -> &'static str {
        "Node.js security releases"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Security
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let node = data.active_node()?;
        let version = node.version.as_deref()?;
        let label = display_version(version);

        let Some(security) = node.security.as_ref().filter(|s| s.checked) else {
            return Some(self.check(
                CheckStatus::Warn,
                format!("Distribution index unavailable; Node {} not checked", label),
            ));
        };

        match &security.target {
            Some(target) if security.vulnerable => {
                let check = self
                    .check(
                        CheckStatus::Warn,
                        format!("Node {} has known vulnerabilities; fixed in {}", label, display_version(target)),
                    )
                    .with_hint(format!("Upgrade to {}", display_version(target)))
                    .with_details(json!({
                        "target": target,
                        "latest_in_major": security.latest_in_major,
                    }));
                Some(check)
            }
            _ => Some(self.check(
                CheckStatus::Pass,
                format!("No security releases after Node {}", label),
            )),
        }
    }
}

/// Security releases newer than installed copies.
pub struct InstalledSecurityRule;

impl HealthRule for InstalledSecurityRule {
    fn id(&self) -> &'static str {
        "installed-security"
    }

    fn name(&self) -> &'static str {
        "Installed versions security"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Security
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        if data.installed.is_empty() {
            return None;
        }
        if !data.feeds.dist_index_available {
            return Some(self.check(
                CheckStatus::Warn,
                "Distribution index unavailable; installed versions not checked".to_string(),
            ));
        }

        let vulnerable: Vec<String> = data
            .installed
            .iter()
            .filter(|i| i.security.vulnerable)
            .map(|i| match &i.security.target {
                Some(target) => format!(
                    "{} {} (fixed in {})",
                    i.manager,
                    display_version(&i.version),
                    display_version(target)
                ),
                None => format!("{} {}", i.manager, display_version(&i.version)),
            })
            .collect();

        if vulnerable.is_empty() {
            return Some(self.check(
                CheckStatus::Pass,
                "No installed version has a pending security release".to_string(),
            ));
        }
        Some(
            self.check(
                CheckStatus::Warn,
                format!("{} installed version(s) have security fixes available: {}", vulnerable.len(), vulnerable.join(", ")),
            )
            .with_hint("Upgrade or uninstall vulnerable versions"),
        )
    }
}

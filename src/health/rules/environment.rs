//! Host environment rules: ports, npm, globals and permissions.

use serde_json::json;

use crate::health::{Check, CheckCategory, CheckStatus, HealthData, HealthRule};
use crate::probes::global_packages::GLOBAL_PACKAGE_LIMIT;

/// Runtime processes already listening on ports.
pub struct PortConflictsRule;

impl HealthRule for PortConflictsRule {
    fn id(&self) -> &'static str {
        "port-conflicts"
    }

    fn name(&self) -> &'static str {
        "Port usage"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Environment
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let ports = data.ports.as_ref()?;
        if ports.is_empty() {
            return Some(self.check(
                CheckStatus::Pass,
                "No runtime processes are holding ports".to_string(),
            ));
        }

        let held: Vec<String> = ports
            .iter()
            .map(|p| format!("{} ({} pid {})", p.port, p.command, p.pid))
            .collect();
        Some(
            self.check(
                CheckStatus::Warn,
                format!("{} port(s) held by runtime processes: {}", ports.len(), held.join(", ")),
            )
            .with_hint("Stop leftover dev servers before starting new ones")
            .with_details(json!({ "ports": ports })),
        )
    }
}

pub struct NpmAvailableRule;

impl HealthRule for NpmAvailableRule {
    fn id(&self) -> &'static str {
        "npm-available"
    }

    fn name(&self) -> &'static str {
        "npm available"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Environment
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        match data.package_managers.version_of("npm") {
            Some(version) => Some(self.check(CheckStatus::Pass, format!("npm {}", version))),
            None => Some(
                self.check(CheckStatus::Warn, "npm was not found on PATH".to_string())
                    .with_hint("Reinstall the runtime; npm ships with it"),
            ),
        }
    }
}

/// Too many globally installed packages.
pub struct GlobalPackagesRule;

impl HealthRule for GlobalPackagesRule {
    fn id(&self) -> &'static str {
        "global-packages"
    }

    fn name(&self) -> &'static str {
        "Global packages"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Environment
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let globals = data.global_packages.as_ref()?;
        let count = globals.count();
        if count > GLOBAL_PACKAGE_LIMIT {
            return Some(
                self.check(
                    CheckStatus::Warn,
                    format!("{} global packages installed (more than {})", count, GLOBAL_PACKAGE_LIMIT),
                )
                .with_hint("Prefer project-local dependencies or npx over global installs"),
            );
        }
        Some(self.check(CheckStatus::Pass, format!("{} global packages installed", count)))
    }
}

pub struct PermissionsRule;

impl HealthRule for PermissionsRule {
    fn id(&self) -> &'static str {
        "permissions"
    }

    fn name(&self) -> &'static str {
        "npm permissions"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Environment
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let report = &data.permissions;
        let mut problems: Vec<String> = report
            .failing()
            .map(|c| match &c.message {
                Some(message) => format!("{} {} ({})", c.name, c.path.display(), message),
                None => format!("{} {} is not writable", c.name, c.path.display()),
            })
            .collect();
        if report.running_as_root {
            problems.push("running as root".to_string());
        }

        if problems.is_empty() {
            if report.checks.is_empty() {
                return None;
            }
            return Some(self.check(
                CheckStatus::Pass,
                "npm global and cache directories are writable".to_string(),
            ));
        }
        Some(
            self.check(CheckStatus::Warn, problems.join("; "))
                .with_hint("Fix ownership of the npm directories instead of using sudo"),
        )
    }
}

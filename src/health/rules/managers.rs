//! Rules about version managers and their interaction.

use serde_json::json;

use crate::aggregate::total_reclaimable;
use crate::health::{Check, CheckCategory, CheckStatus, HealthData, HealthRule};
use crate::probes::path_scan::{authoritative_manager, OWNER_SYSTEM};
use crate::sys::fs::human_size;
use crate::version;

/// More than one manager putting a runtime on PATH.
pub struct VersionManagerConflictRule;

impl HealthRule for VersionManagerConflictRule {
    fn id(&self) -> &'static str {
        "version-manager-conflict"
    }

    fn name(&self) -> &'static str {
        "Version manager conflicts"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Managers
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let active = &data.active_managers;
        if active.len() > 1 {
            return Some(
                self.check(
                    CheckStatus::Warn,
                    format!("Multiple version managers active: {}", active.join(", ")),
                )
                .with_hint(format!(
                    "Pick one manager; {} wins because it is first on PATH",
                    active[0]
                ))
                .with_details(json!({ "active": active })),
            );
        }

        // Only PATH entry 0 decides which manager is in use.
        if let Some(owner) = authoritative_manager(&data.nodes_in_path) {
            return Some(self.check(CheckStatus::Pass, format!("Using {}", owner)));
        }

        if let (Some(first), Some(shadowed)) = (data.nodes_in_path.first(), active.first()) {
            return Some(
                self.check(
                    CheckStatus::Pass,
                    format!(
                        "No manager in use: {} runtime is first on PATH, {} is shadowed",
                        first.owner, shadowed
                    ),
                )
                .with_hint(format!(
                    "Put {}'s bin directory ahead of {} on PATH to use it",
                    shadowed,
                    first.executable.parent().unwrap_or(first.executable.as_path()).display()
                )),
            );
        }

        let installed: Vec<&str> = data
            .managers
            .iter()
            .filter(|m| m.name != OWNER_SYSTEM)
            .map(|m| m.name.as_str())
            .collect();
        let check = if installed.is_empty() {
            self.check(CheckStatus::Pass, "No version managers detected".to_string())
        } else {
            self.check(
                CheckStatus::Pass,
                format!("Installed only, none active on PATH: {}", installed.join(", ")),
            )
        };
        Some(check)
    }
}

/// The same version installed by several managers.
pub struct DuplicateVersionsRule;

impl HealthRule for DuplicateVersionsRule {
    fn id(&self) -> &'static str {
        "duplicate-versions"
    }

    fn name(&self) -> &'static str {
        "Duplicate versions"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Managers
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let duplicates = &data.duplicates;
        if duplicates.is_empty() {
            return Some(self.check(
                CheckStatus::Pass,
                "No version is installed by more than one manager".to_string(),
            ));
        }

        let listed: Vec<String> = duplicates
            .iter()
            .map(|d| format!("{} ({})", d.version, d.managers.join(", ")))
            .collect();
        Some(
            self.check(
                CheckStatus::Warn,
                format!("{} duplicate version(s): {}", duplicates.len(), listed.join("; ")),
            )
            .with_hint(format!(
                "Keep one copy of each to reclaim about {}",
                human_size(total_reclaimable(duplicates))
            )),
        )
    }
}

/// Several managers initialised from shell profiles.
pub struct ShellConfigManagersRule;

impl HealthRule for ShellConfigManagersRule {
    fn id(&self) -> &'static str {
        "shell-config-managers"
    }

    fn name(&self) -> &'static str {
        "Shell configuration"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Managers
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let scan = data.shell.as_ref()?;
        let managers = scan.managers();
        let check = match managers.len() {
            0 => self.check(
                CheckStatus::Pass,
                "No version manager initialisation in shell profiles".to_string(),
            ),
            1 => self.check(
                CheckStatus::Pass,
                format!("Shell profiles initialise {}", managers[0]),
            ),
            _ => {
                let files: Vec<String> = scan
                    .findings
                    .iter()
                    .map(|f| format!("{}:{} ({})", f.file.display(), f.line_number, f.manager))
                    .collect();
                self.check(
                    CheckStatus::Warn,
                    format!("Shell profiles initialise {} managers: {}", managers.len(), managers.join(", ")),
                )
                .with_hint("Remove the initialisation lines of the managers you no longer use")
                .with_details(json!({ "lines": files }))
            }
        };
        Some(check)
    }
}

fn alias_installed(alias: &str, versions: &[String]) -> bool {
    let alias = version::normalize(alias);
    let prefix = format!("{}.", alias);
    versions.iter().any(|v| {
        let v = version::normalize(v);
        v == alias || v.starts_with(&prefix)
    })
}

/// A manager's default alias pointing at a version it does not have.
pub struct ManagerDefaultVersionRule;

impl HealthRule for ManagerDefaultVersionRule {
    fn id(&self) -> &'static str {
        "manager-default-version"
    }

    fn name(&self) -> &'static str {
        "Manager default version"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Managers
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let with_default: Vec<_> = data
            .managers
            .iter()
            .filter_map(|m| m.default_version.as_deref().map(|d| (m, d)))
            .collect();
        if with_default.is_empty() {
            return None;
        }

        let broken: Vec<String> = with_default
            .iter()
            // named aliases such as lts/* resolve at runtime
            .filter(|(_, d)| version::looks_like_version(d))
            .filter(|(m, d)| !alias_installed(d, &m.versions))
            .map(|(m, d)| format!("{} default {} is not installed", m.display_name, d))
            .collect();

        if broken.is_empty() {
            return Some(self.check(
                CheckStatus::Pass,
                "Manager default versions are installed".to_string(),
            ));
        }
        Some(
            self.check(CheckStatus::Warn, broken.join("; "))
                .with_hint("Install the default version or point the default alias at an installed one"),
        )
    }
}

/// A manager that needs its environment variable exported.
pub struct ManagerEnvRule;

impl HealthRule for ManagerEnvRule {
    fn id(&self) -> &'static str {
        "manager-env"
    }

    fn name(&self) -> &'static str {
        "Manager environment"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Managers
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let required: Vec<_> = data.managers.iter().filter(|m| m.env_required).collect();
        if required.is_empty() {
            return None;
        }

        let unset: Vec<String> = required
            .iter()
            .filter(|m| m.env_var_set == Some(false))
            .map(|m| {
                format!(
                    "{} is not set for {}",
                    m.env_var.as_deref().unwrap_or("environment variable"),
                    m.display_name
                )
            })
            .collect();

        if unset.is_empty() {
            return Some(self.check(
                CheckStatus::Pass,
                "Manager environment variables are set".to_string(),
            ));
        }
        Some(
            self.check(CheckStatus::Warn, unset.join("; "))
                .with_hint("Source the manager's init script from your shell profile"),
        )
    }
}

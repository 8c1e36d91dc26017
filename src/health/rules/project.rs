//! Rules about the project in the working directory.

use crate::health::{Check, CheckCategory, CheckStatus, HealthData, HealthRule};
use crate::version;

use super::display_version;

/// `packageManager` declared without corepack shims.
pub struct CorepackRule;

impl HealthRule for CorepackRule {
    fn id(&self) -> &'static str {
        "corepack"
    }

    fn name(&self) -> &'static str {
        "Corepack"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Project
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let declared = data.project.package_manager.as_deref()?;
        let corepack = &data.corepack;

        if corepack.enabled {
            return Some(self.check(
                CheckStatus::Pass,
                format!("packageManager {} is provided by corepack", declared),
            ));
        }
        let message = if corepack.available {
            format!("package.json declares {} but corepack is not enabled", declared)
        } else {
            format!("package.json declares {} but corepack is not available", declared)
        };
        Some(
            self.check(CheckStatus::Warn, message)
                .with_hint("Run `corepack enable` so the declared package manager is used"),
        )
    }
}

/// Lock files from more than one package manager.
pub struct LockfileConflictsRule;

impl HealthRule for LockfileConflictsRule {
    fn id(&self) -> &'static str {
        "lockfile-conflicts"
    }

    fn name(&self) -> &'static str {
        "Lock files"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Project
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let lockfiles = &data.project.lockfiles;
        match lockfiles.len() {
            0 => None,
            1 => Some(self.check(
                CheckStatus::Pass,
                format!("Single lock file {}", lockfiles[0].file),
            )),
            _ => {
                let files: Vec<&str> = lockfiles.iter().map(|l| l.file.as_str()).collect();
                Some(
                    self.check(
                        CheckStatus::Warn,
                        format!("{} lock files present: {}", files.len(), files.join(", ")),
                    )
                    .with_hint("Keep the lock file of the package manager the project uses and delete the rest"),
                )
            }
        }
    }
}

/// Pin file disagreeing with the active runtime.
pub struct NodeVersionPinRule;

impl HealthRule for NodeVersionPinRule {
    fn id(&self) -> &'static str {
        "node-version-pin"
    }

    fn name(&self) -> &'static str {
        "Pinned version"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Project
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let pin = data.project.pinned_version()?;
        let active = data.active_version()?;

        if !version::looks_like_version(&pin.value) {
            return Some(self.check(
                CheckStatus::Pass,
                format!("{} pins alias {}", pin.source, pin.value),
            ));
        }

        if version::major(&pin.value) != version::major(active) {
            return Some(
                self.check(
                    CheckStatus::Warn,
                    format!(
                        "{} pins {} but the active runtime is {}",
                        pin.source,
                        pin.value,
                        display_version(active)
                    ),
                )
                .with_hint("Switch versions with your manager (for example `nvm use` or `fnm use`)"),
            );
        }
        Some(self.check(
            CheckStatus::Pass,
            format!("{} pins {}, matching {}", pin.source, pin.value, display_version(active)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::rules::fixtures::path_node;
    use crate::probes::project::{Lockfile, PinSource, VersionPin};

    #[test]
    fn corepack_only_applies_with_package_manager() {
        let mut data = HealthData::default();
        assert!(CorepackRule.evaluate(&data).is_none());

        data.project.package_manager = Some("pnpm@9.1.0".to_string());
        data.corepack.available = true;
        let check = CorepackRule.evaluate(&data).unwrap();
        assert_eq!(check.status, CheckStatus::Warn);
        assert!(check.message.contains("not enabled"));

        data.corepack.enabled = true;
        assert_eq!(CorepackRule.evaluate(&data).unwrap().status, CheckStatus::Pass);
    }

    #[test]
    fn multiple_lockfiles_warn() {
        let lock = |file: &str, manager: &str| Lockfile {
            file: file.to_string(),
            manager: manager.to_string(),
        };
        let mut data = HealthData::default();
        assert!(LockfileConflictsRule.evaluate(&data).is_none());

        data.project.lockfiles.push(lock("package-lock.json", "npm"));
        assert_eq!(LockfileConflictsRule.evaluate(&data).unwrap().status, CheckStatus::Pass);

        data.project.lockfiles.push(lock("yarn.lock", "yarn"));
        let check = LockfileConflictsRule.evaluate(&data).unwrap();
        assert_eq!(check.status, CheckStatus::Warn);
        assert!(check.message.contains("yarn.lock"));
    }

    #[test]
    fn pin_compared_by_major() {
        let mut data = HealthData {
            nodes_in_path: vec![path_node("/usr/local/bin/node", "v20.11.0", "system")],
            ..Default::default()
        };
        assert!(NodeVersionPinRule.evaluate(&data).is_none());

        data.project.pins.push(VersionPin {
            source: PinSource::Nvmrc,
            value: "20".to_string(),
        });
        assert_eq!(NodeVersionPinRule.evaluate(&data).unwrap().status, CheckStatus::Pass);

        data.project.pins[0].value = "18.19.0".to_string();
        let check = NodeVersionPinRule.evaluate(&data).unwrap();
        assert_eq!(check.status, CheckStatus::Warn);
        assert!(check.message.starts_with(".nvmrc pins 18.19.0"));

        data.project.pins[0].value = "lts/iron".to_string();
        assert_eq!(NodeVersionPinRule.evaluate(&data).unwrap().status, CheckStatus::Pass);
    }
}

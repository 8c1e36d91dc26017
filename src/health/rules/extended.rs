//! Rules over the extended heuristics bundle.

use serde_json::json;

use crate::health::{Check, CheckCategory, CheckStatus, HealthData, HealthRule};
use crate::probes::extended::cache_health::CACHE_SIZE_LIMIT;
use crate::sys::fs::human_size;

pub struct NpmPrefixRule;

impl HealthRule for NpmPrefixRule {
    fn id(&self) -> &'static str {
        "npm-prefix"
    }

    fn name(&self) -> &'static str {
        "npm global prefix"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Environment
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let check = &data.extended.npm_prefix;
        let prefix = check.prefix.as_ref()?;
        let manager = check.active_manager.as_deref()?;

        if check.mismatch {
            let root = check
                .manager_root
                .as_ref()
                .map(|r| r.display().to_string())
                .unwrap_or_default();
            return Some(
                self.check(
                    CheckStatus::Warn,
                    format!(
                        "npm prefix {} is outside the {} directory {}",
                        prefix.display(),
                        manager,
                        root
                    ),
                )
                .with_hint("Remove the `prefix` setting from your .npmrc so global installs follow the active version"),
            );
        }
        Some(self.check(
            CheckStatus::Pass,
            format!("npm prefix {} belongs to {}", prefix.display(), manager),
        ))
    }
}

pub struct ShellStartupRule;

impl HealthRule for ShellStartupRule {
    fn id(&self) -> &'static str {
        "shell-startup"
    }

    fn name(&self) -> &'static str {
        "Shell startup time"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Performance
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let startup = data.extended.shell_startup.as_ref()?;
        if !startup.is_slow() {
            return Some(self.check(
                CheckStatus::Pass,
                "No slow version manager initialisation in shell profiles".to_string(),
            ));
        }

        let mut causes = Vec::new();
        if !startup.eager_inits.is_empty() {
            causes.push(format!("{} eager eval initialiser(s)", startup.eager_inits.len()));
        }
        if !startup.multi_manager_files.is_empty() {
            causes.push(format!(
                "{} file(s) initialising several managers",
                startup.multi_manager_files.len()
            ));
        }
        if !startup.nvm_without_no_use.is_empty() {
            causes.push("nvm sourced without --no-use".to_string());
        }
        let lines: Vec<String> = startup
            .eager_inits
            .iter()
            .chain(&startup.nvm_without_no_use)
            .map(|f| format!("{}:{}", f.file.display(), f.line_number))
            .collect();

        Some(
            self.check(
                CheckStatus::Warn,
                format!("Shell startup may be slow: {}", causes.join(", ")),
            )
            .with_hint("Load managers lazily or add --no-use to the nvm source line")
            .with_details(json!({ "lines": lines })),
        )
    }
}

pub struct VersionFileConflictsRule;

impl HealthRule for VersionFileConflictsRule {
    fn id(&self) -> &'static str {
        "version-file-conflicts"
    }

    fn name(&self) -> &'static str {
        "Version file conflicts"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Project
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let files = &data.extended.version_files;
        if files.pins.len() < 2 {
            return None;
        }
        if files.has_conflict() {
            return Some(
                self.check(CheckStatus::Warn, files.conflicts.join("; "))
                    .with_hint("Keep a single source of truth for the runtime version"),
            );
        }
        Some(self.check(
            CheckStatus::Pass,
            format!("{} version declarations agree", files.pins.len()),
        ))
    }
}

pub struct EnginesComplianceRule;

impl HealthRule for EnginesComplianceRule {
    fn id(&self) -> &'static str {
        "engines-compliance"
    }

    fn name(&self) -> &'static str {
        "engines compliance"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Project
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let engines = &data.extended.engines;
        if engines.checks.is_empty() {
            return None;
        }

        let violations: Vec<String> = engines
            .violations()
            .map(|c| {
                format!(
                    "{} {} requires {}",
                    c.name,
                    c.version.as_deref().unwrap_or("?"),
                    c.range
                )
            })
            .collect();
        if violations.is_empty() {
            return Some(self.check(
                CheckStatus::Pass,
                format!("{} engines constraint(s) satisfied or unchecked", engines.checks.len()),
            ));
        }
        Some(
            self.check(
                CheckStatus::Warn,
                format!("engines not satisfied: {}", violations.join("; ")),
            )
            .with_hint("Switch to a version matching package.json engines"),
        )
    }
}

pub struct NativeBuildToolsRule;

impl HealthRule for NativeBuildToolsRule {
    fn id(&self) -> &'static str {
        "native-build-tools"
    }

    fn name(&self) -> &'static str {
        "Native build tools"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Environment
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let tools = data.extended.native_build.as_ref()?;
        if tools.ready {
            return Some(self.check(
                CheckStatus::Pass,
                "Toolchain for native addons is available".to_string(),
            ));
        }
        let missing = tools.missing(data.system.platform);
        Some(
            self.check(
                CheckStatus::Warn,
                format!("Native addons cannot be built; missing {}", missing.join(", ")),
            )
            .with_hint("Install the node-gyp prerequisites for your platform"),
        )
    }
}

pub struct CacheHealthRule;

impl HealthRule for CacheHealthRule {
    fn id(&self) -> &'static str {
        "cache-health"
    }

    fn name(&self) -> &'static str {
        "npm cache"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Performance
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let cache = data.extended.cache.as_ref().filter(|c| c.exists)?;
        let size = human_size(cache.size);

        if cache.verify_ok == Some(false) {
            return Some(
                self.check(
                    CheckStatus::Warn,
                    format!("npm cache at {} failed verification", cache.path.display()),
                )
                .with_hint("Run `npm cache clean --force`"),
            );
        }
        if cache.exceeds_limit {
            return Some(
                self.check(
                    CheckStatus::Warn,
                    format!(
                        "npm cache is {} (over {})",
                        size,
                        human_size(CACHE_SIZE_LIMIT)
                    ),
                )
                .with_hint("Run `npm cache clean --force` to reclaim space"),
            );
        }
        Some(self.check(CheckStatus::Pass, format!("npm cache is {}", size)))
    }
}

pub struct GlobalRootRule;

impl HealthRule for GlobalRootRule {
    fn id(&self) -> &'static str {
        "global-root"
    }

    fn name(&self) -> &'static str {
        "Global install root"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Environment
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let check = &data.extended.global_root;
        let root = check.root.as_ref()?;
        if check.matches {
            return Some(self.check(
                CheckStatus::Pass,
                format!("Global packages install into {}", root.display()),
            ));
        }
        let expected = check
            .expected_under
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Some(
            self.check(
                CheckStatus::Warn,
                format!(
                    "Global packages install into {}, not the active {} runtime at {}",
                    root.display(),
                    check.owner,
                    expected
                ),
            )
            .with_hint("Global CLIs will not be found after switching versions"),
        )
    }
}

pub struct SymlinkSupportRule;

impl HealthRule for SymlinkSupportRule {
    fn id(&self) -> &'static str {
        "symlink-support"
    }

    fn name(&self) -> &'static str {
        "Symlink support"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Environment
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let links = data.extended.symlinks.as_ref()?;
        if links.supported() {
            return Some(self.check(CheckStatus::Pass, "Symlinks can be created".to_string()));
        }
        let reason = links.error.as_deref().unwrap_or("permission denied");
        Some(
            self.check(
                CheckStatus::Warn,
                format!("Cannot create symlinks or junctions ({})", reason),
            )
            .with_hint("npm link and workspaces need symlinks; on Windows enable Developer Mode"),
        )
    }
}

pub struct StaleNativeDepsRule;

impl HealthRule for StaleNativeDepsRule {
    fn id(&self) -> &'static str {
        "stale-native-deps"
    }

    fn name(&self) -> &'static str {
        "Stale native dependencies"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Project
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let stale = &data.extended.stale_native;
        if stale.native_modules.is_empty() {
            return None;
        }
        if stale.stale {
            return Some(
                self.check(
                    CheckStatus::Warn,
                    format!(
                        "{} native module(s) built for Node {} but running Node {}: {}",
                        stale.native_modules.len(),
                        stale.engines_major.unwrap_or_default(),
                        stale.running_major.unwrap_or_default(),
                        stale.native_modules.join(", ")
                    ),
                )
                .with_hint("Run `npm rebuild`"),
            );
        }
        Some(self.check(
            CheckStatus::Pass,
            format!("{} native module(s) match the running major", stale.native_modules.len()),
        ))
    }
}

pub struct IdeIntegrationRule;

impl HealthRule for IdeIntegrationRule {
    fn id(&self) -> &'static str {
        "ide-integration"
    }

    fn name(&self) -> &'static str {
        "Editor integration"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Project
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let ide = &data.extended.ide;
        if ide.settings_path.is_none() && !ide.missing_recommendations {
            return None;
        }
        if !ide.has_issues() {
            return Some(self.check(
                CheckStatus::Pass,
                "Editor settings follow the active runtime".to_string(),
            ));
        }

        let mut issues: Vec<String> = ide
            .hardcoded_paths
            .iter()
            .map(|p| format!("hard-coded runtime {}", p))
            .collect();
        if ide.inherit_env_disabled {
            issues.push("terminal.integrated.inheritEnv is false".to_string());
        }
        if ide.missing_recommendations {
            issues.push("no recommended extensions for a pinned project".to_string());
        }
        Some(
            self.check(CheckStatus::Warn, issues.join("; "))
                .with_hint("Let the editor resolve node from PATH so the manager's version is used"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::extended::engines::EngineCheck;
    use crate::probes::extended::{
        CacheHealth, GlobalRootCheck, NativeBuildTools, NpmPrefixCheck, ShellStartup,
        StaleNativeDeps, SymlinkCapability,
    };
    use crate::probes::project::{PinSource, VersionPin};
    use crate::probes::shell_config::{LineKind, ShellFinding};
    use crate::version::RangeKind;
    use std::path::PathBuf;

    fn status(rule: &dyn HealthRule, data: &HealthData) -> Option<CheckStatus> {
        rule.evaluate(data).map(|c| c.status)
    }

    #[test]
    fn npm_prefix_mismatch() {
        let mut data = HealthData::default();
        assert_eq!(status(&NpmPrefixRule, &data), None);

        data.extended.npm_prefix = NpmPrefixCheck {
            prefix: Some(PathBuf::from("/usr/local")),
            active_manager: Some("nvm".to_string()),
            manager_root: Some(PathBuf::from("/home/u/.nvm")),
            mismatch: true,
        };
        assert_eq!(status(&NpmPrefixRule, &data), Some(CheckStatus::Warn));

        data.extended.npm_prefix.mismatch = false;
        assert_eq!(status(&NpmPrefixRule, &data), Some(CheckStatus::Pass));
    }

    #[test]
    fn slow_shell_startup() {
        let mut data = HealthData::default();
        assert_eq!(status(&ShellStartupRule, &data), None);

        data.extended.shell_startup = Some(ShellStartup::default());
        assert_eq!(status(&ShellStartupRule, &data), Some(CheckStatus::Pass));

        data.extended.shell_startup = Some(ShellStartup {
            nvm_without_no_use: vec![ShellFinding {
                file: PathBuf::from("/home/u/.bashrc"),
                line_number: 3,
                manager: "nvm".to_string(),
                kind: LineKind::Source,
                line: ". \"$NVM_DIR/nvm.sh\"".to_string(),
                eager: false,
            }],
            ..Default::default()
        });
        let check = ShellStartupRule.evaluate(&data).unwrap();
        assert_eq!(check.status, CheckStatus::Warn);
        assert!(check.message.contains("--no-use"));
    }

    #[test]
    fn version_file_conflicts() {
        let pin = |source, value: &str| VersionPin {
            source,
            value: value.to_string(),
        };
        let mut data = HealthData::default();
        data.extended.version_files.pins = vec![pin(PinSource::Nvmrc, "20")];
        assert_eq!(status(&VersionFileConflictsRule, &data), None);

        data.extended.version_files.pins.push(pin(PinSource::NodeVersion, "20.1.0"));
        assert_eq!(status(&VersionFileConflictsRule, &data), Some(CheckStatus::Pass));

        data.extended.version_files.conflicts = vec![".nvmrc (20) and .node-version (18) pin different majors".to_string()];
        assert_eq!(status(&VersionFileConflictsRule, &data), Some(CheckStatus::Warn));
    }

    #[test]
    fn engines_violation() {
        let mut data = HealthData::default();
        assert_eq!(status(&EnginesComplianceRule, &data), None);

        data.extended.engines.checks.push(EngineCheck {
            name: "node".to_string(),
            range: ">=22".to_string(),
            kind: RangeKind::Range,
            version: Some("20.1.0".to_string()),
            satisfied: Some(false),
        });
        let check = EnginesComplianceRule.evaluate(&data).unwrap();
        assert_eq!(check.status, CheckStatus::Warn);
        assert!(check.message.contains("node 20.1.0 requires >=22"));
    }

    #[test]
    fn native_build_missing_tools() {
        let mut data = HealthData::default();
        data.system.platform = crate::platform::Platform::Linux;
        data.extended.native_build = Some(NativeBuildTools {
            python: Some("Python 3.12.0".to_string()),
            ..Default::default()
        });
        let check = NativeBuildToolsRule.evaluate(&data).unwrap();
        assert_eq!(check.status, CheckStatus::Warn);
        assert!(check.message.contains("make"));
    }

    #[test]
    fn cache_over_limit() {
        let mut data = HealthData::default();
        data.extended.cache = Some(CacheHealth {
            path: PathBuf::from("/home/u/.npm"),
            exists: true,
            size: CACHE_SIZE_LIMIT + 1,
            exceeds_limit: true,
            has_cacache: true,
            verify_ok: Some(true),
        });
        assert_eq!(status(&CacheHealthRule, &data), Some(CheckStatus::Warn));

        if let Some(cache) = data.extended.cache.as_mut() {
            cache.size = 1024;
            cache.exceeds_limit = false;
        }
        assert_eq!(status(&CacheHealthRule, &data), Some(CheckStatus::Pass));

        if let Some(cache) = data.extended.cache.as_mut() {
            cache.exists = false;
        }
        assert_eq!(status(&CacheHealthRule, &data), None);
    }

    #[test]
    fn global_root_mismatch() {
        let mut data = HealthData::default();
        assert_eq!(status(&GlobalRootRule, &data), None);

        data.extended.global_root = GlobalRootCheck {
            root: Some(PathBuf::from("/usr/local/lib/node_modules")),
            expected_under: Some(PathBuf::from("/home/u/.nvm/versions/node/v20.1.0")),
            owner: "nvm".to_string(),
            matches: false,
        };
        assert_eq!(status(&GlobalRootRule, &data), Some(CheckStatus::Warn));
    }

    #[test]
    fn symlink_support() {
        let mut data = HealthData::default();
        data.extended.symlinks = Some(SymlinkCapability {
            symlink: false,
            junction: Some(true),
            error: None,
        });
        assert_eq!(status(&SymlinkSupportRule, &data), Some(CheckStatus::Pass));

        data.extended.symlinks = Some(SymlinkCapability {
            symlink: false,
            junction: Some(false),
            error: Some("A required privilege is not held by the client".to_string()),
        });
        assert_eq!(status(&SymlinkSupportRule, &data), Some(CheckStatus::Warn));
    }

    #[test]
    fn stale_native_deps_hint_rebuild() {
        let mut data = HealthData::default();
        assert_eq!(status(&StaleNativeDepsRule, &data), None);

        data.extended.stale_native = StaleNativeDeps {
            native_modules: vec!["bcrypt".to_string()],
            engines_major: Some(16),
            running_major: Some(20),
            stale: true,
        };
        let check = StaleNativeDepsRule.evaluate(&data).unwrap();
        assert_eq!(check.status, CheckStatus::Warn);
        assert_eq!(check.hint.as_deref(), Some("Run `npm rebuild`"));
    }

    #[test]
    fn ide_issues() {
        let mut data = HealthData::default();
        assert_eq!(status(&IdeIntegrationRule, &data), None);

        data.extended.ide.settings_path = Some(PathBuf::from(".vscode/settings.json"));
        assert_eq!(status(&IdeIntegrationRule, &data), Some(CheckStatus::Pass));

        data.extended.ide.inherit_env_disabled = true;
        let check = IdeIntegrationRule.evaluate(&data).unwrap();
        assert_eq!(check.status, CheckStatus::Warn);
        assert!(check.message.contains("inheritEnv"));
    }
}

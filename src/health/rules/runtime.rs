//! Rules about the active runtime itself.

use serde_json::json;

use crate::health::{Check, CheckCategory, CheckStatus, HealthData, HealthRule};
use crate::platform::Platform;

use super::display_version;

/// At least one runtime on PATH, ideally exactly one.
pub struct NodeInPathRule;

impl HealthRule for NodeInPathRule {
    fn id(&self) -> &'static str {
        "node-in-path"
    }

    fn name(&self) -> &'static str {
        "Node.js in PATH"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Runtime
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let nodes = &data.nodes_in_path;
        let Some(active) = nodes.first() else {
            return Some(
                self.check(CheckStatus::Fail, "No Node.js runtime found on PATH".to_string())
                    .with_hint("Install Node.js or initialise your version manager in your shell profile"),
            );
        };

        let label = active
            .version
            .as_deref()
            .map(display_version)
            .unwrap_or_else(|| "unknown version".to_string());

        if nodes.len() == 1 {
            return Some(self.check(
                CheckStatus::Pass,
                format!("Node {} at {} ({})", label, active.executable.display(), active.owner),
            ));
        }

        let shadowed = nodes.len() - 1;
        let executables: Vec<String> = nodes
            .iter()
            .map(|n| n.executable.display().to_string())
            .collect();
        Some(
            self.check(
                CheckStatus::Warn,
                format!(
                    "{} runtimes on PATH; {} shadowed by {} ({})",
                    nodes.len(),
                    shadowed,
                    active.executable.display(),
                    label
                ),
            )
            .with_hint("Remove stale PATH entries so a single manager provides node")
            .with_details(json!({ "executables": executables })),
        )
    }
}

/// `NODE_PATH` and `NODE_OPTIONS --require` change module resolution for
/// every project.
pub struct NodeEnvVarsRule;

fn preloads_module(options: &str) -> bool {
    options
        .split_whitespace()
        .any(|t| t == "-r" || t == "--require" || t.starts_with("--require="))
}

impl HealthRule for NodeEnvVarsRule {
    fn id(&self) -> &'static str {
        "node-env-vars"
    }

    fn name(&self) -> &'static str {
        "Node environment variables"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Runtime
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let vars = &data.env_vars;
        let mut problems = Vec::new();
        if let Some(node_path) = &vars.node_path {
            problems.push(format!("NODE_PATH is set ({})", node_path));
        }
        if let Some(options) = vars.node_options.as_deref().filter(|o| preloads_module(o)) {
            problems.push(format!("NODE_OPTIONS preloads a module ({})", options));
        }

        if problems.is_empty() {
            return Some(self.check(
                CheckStatus::Pass,
                "No global module overrides in the environment".to_string(),
            ));
        }
        Some(
            self.check(CheckStatus::Warn, problems.join("; "))
                .with_hint("Unset these variables unless every project needs them"),
        )
    }
}

/// An x64 runtime on Apple silicon runs under Rosetta.
pub struct NodeArchRule;

impl HealthRule for NodeArchRule {
    fn id(&self) -> &'static str {
        "node-arch"
    }

    fn name(&self) -> &'static str {
        "Runtime architecture"
    }

    fn category(&self) -> CheckCategory {
        CheckCategory::Runtime
    }

    fn evaluate(&self, data: &HealthData) -> Option<Check> {
        let arch = data.active_arch.as_deref()?;
        let host = data.system.arch.as_str();

        if data.system.platform == Platform::Darwin && host == "arm64" && arch == "x64" {
            return Some(
                self.check(
                    CheckStatus::Warn,
                    "x64 runtime running under Rosetta on an arm64 host".to_string(),
                )
                .with_hint("Reinstall the runtime from an arm64 shell for native performance"),
            );
        }
        Some(self.check(
            CheckStatus::Pass,
            format!("Runtime architecture {} on {} host", arch, host),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::rules::fixtures::path_node;

    #[test]
    fn no_runtime_fails() {
        let check = NodeInPathRule.evaluate(&HealthData::default()).unwrap();
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(check.hint.is_some());
    }

    #[test]
    fn single_runtime_passes() {
        let data = HealthData {
            nodes_in_path: vec![path_node("/home/u/.nvm/versions/node/v20.1.0/bin/node", "v20.1.0", "nvm")],
            ..Default::default()
        };
        let check = NodeInPathRule.evaluate(&data).unwrap();
        assert_eq!(check.status, CheckStatus::Pass);
        assert!(check.message.contains("v20.1.0"));
        assert!(check.message.contains("nvm"));
    }

    #[test]
    fn multiple_runtimes_warn_with_shadowed_count() {
        let data = HealthData {
            nodes_in_path: vec![
                path_node("/home/u/.nvm/versions/node/v20.1.0/bin/node", "v20.1.0", "nvm"),
                path_node("/usr/local/bin/node", "v18.0.0", "system"),
                path_node("/usr/bin/node", "v16.0.0", "system"),
            ],
            ..Default::default()
        };
        let check = NodeInPathRule.evaluate(&data).unwrap();
        assert_eq!(check.status, CheckStatus::Warn);
        assert!(check.message.contains("3 runtimes"));
        assert!(check.message.contains("2 shadowed"));
    }

    #[test]
    fn env_vars() {
        let mut data = HealthData::default();
        assert_eq!(NodeEnvVarsRule.evaluate(&data).unwrap().status, CheckStatus::Pass);

        data.env_vars.node_options = Some("--max-old-space-size=4096".to_string());
        assert_eq!(NodeEnvVarsRule.evaluate(&data).unwrap().status, CheckStatus::Pass);

        data.env_vars.node_options = Some("-r ts-node/register".to_string());
        assert_eq!(NodeEnvVarsRule.evaluate(&data).unwrap().status, CheckStatus::Warn);

        data.env_vars.node_options = None;
        data.env_vars.node_path = Some("/opt/lib".to_string());
        let check = NodeEnvVarsRule.evaluate(&data).unwrap();
        assert_eq!(check.status, CheckStatus::Warn);
        assert!(check.message.contains("NODE_PATH"));
    }

    #[test]
    fn rosetta_runtime_warns() {
        let mut data = HealthData::default();
        assert!(NodeArchRule.evaluate(&data).is_none());

        data.system.platform = Platform::Darwin;
        data.system.arch = "arm64".to_string();
        data.active_arch = Some("x64".to_string());
        assert_eq!(NodeArchRule.evaluate(&data).unwrap().status, CheckStatus::Warn);

        data.active_arch = Some("arm64".to_string());
        assert_eq!(NodeArchRule.evaluate(&data).unwrap().status, CheckStatus::Pass);

        data.system.platform = Platform::Linux;
        data.active_arch = Some("x64".to_string());
        assert_eq!(NodeArchRule.evaluate(&data).unwrap().status, CheckStatus::Pass);
    }
}

//! VS Code workspace settings that fight the version manager.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sys::fs::read_optional;

/// Settings whose value is a runtime executable path.
const RUNTIME_PATH_KEYS: &[&str] = &[
    "eslint.runtime",
    "eslint.nodePath",
    "prettier.runtime",
    "typescript.tsserver.nodePath",
    "jest.nodeExecutable",
    "npm.binPath",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeIntegration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_path: Option<PathBuf>,
    /// `key = value` entries pinning an absolute runtime path.
    pub hardcoded_paths: Vec<String>,
    /// `terminal.integrated.inheritEnv` is `false`.
    pub inherit_env_disabled: bool,
    /// The project pins a version but recommends no extensions.
    pub missing_recommendations: bool,
}

impl IdeIntegration {
    pub fn has_issues(&self) -> bool {
        !self.hardcoded_paths.is_empty() || self.inherit_env_disabled || self.missing_recommendations
    }
}

/// Remove `//` and `/* */` comments and trailing commas from JSONC.
pub fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    // trailing commas before } or ]
    let mut cleaned = String::with_capacity(out.len());
    let bytes: Vec<char> = out.chars().collect();
    for (i, c) in bytes.iter().enumerate() {
        if *c == ',' {
            let next = bytes[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        cleaned.push(*c);
    }
    cleaned
}

fn is_absolute_path(value: &str) -> bool {
    value.starts_with('/')
        || value.starts_with("~/")
        || (value.len() > 2 && value.as_bytes()[1] == b':' && value.as_bytes()[0].is_ascii_alphabetic())
}

/// Inspect `.vscode/` under `root`. `has_pin` says whether the project
/// pins a runtime version.
pub fn check_ide(root: &Path, has_pin: bool) -> IdeIntegration {
    let vscode = root.join(".vscode");
    let mut result = IdeIntegration::default();
    if !vscode.is_dir() {
        return result;
    }

    let settings_path = vscode.join("settings.json");
    if let Some(content) = read_optional(&settings_path) {
        match serde_json::from_str::<serde_json::Value>(&strip_jsonc(&content)) {
            Ok(settings) => {
                for key in RUNTIME_PATH_KEYS {
                    if let Some(value) = settings.get(*key).and_then(|v| v.as_str()) {
                        if is_absolute_path(value) {
                            result.hardcoded_paths.push(format!("{} = {}", key, value));
                        }
                    }
                }
                result.inherit_env_disabled = settings
                    .get("terminal.integrated.inheritEnv")
                    .and_then(|v| v.as_bool())
                    == Some(false);
            }
            Err(e) => tracing::debug!("Ignoring unparsable {}: {}", settings_path.display(), e),
        }
        result.settings_path = Some(settings_path);
    }

    if has_pin {
        let recommends_any = read_optional(&vscode.join("extensions.json"))
            .and_then(|c| serde_json::from_str::<serde_json::Value>(&strip_jsonc(&c)).ok())
            .and_then(|v| v.get("recommendations")?.as_array().map(|a| !a.is_empty()))
            .unwrap_or(false);
        result.missing_recommendations = !recommends_any;
    }
    result
}

//! Shell startup file scan.
//!
//! Looks for version-manager initialisation in the user's shell profiles.
//! Commented-out lines are skipped.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::platform::HostEnv;
use crate::sys::fs::read_optional;

/// Profile files scanned, relative to the home directory.
pub const SHELL_FILES: &[&str] = &[
    ".bashrc",
    ".bash_profile",
    ".bash_login",
    ".bash_aliases",
    ".bashrc.local",
    ".profile",
    ".zshrc",
    ".zshenv",
    ".zprofile",
    ".zlogin",
    ".zshrc.local",
    ".kshrc",
    ".mkshrc",
    ".cshrc",
    ".tcshrc",
    ".config/fish/config.fish",
    ".config/fish/conf.d/nvm.fish",
    ".config/fish/conf.d/fnm.fish",
    ".config/fish/conf.d/mise.fish",
    ".config/fish/conf.d/volta.fish",
    ".config/nushell/env.nu",
    ".config/nushell/config.nu",
    ".config/powershell/Microsoft.PowerShell_profile.ps1",
    "Documents/PowerShell/Microsoft.PowerShell_profile.ps1",
    "Documents/WindowsPowerShell/Microsoft.PowerShell_profile.ps1",
];

/// What a matching line does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Runs the manager's shell hook (`eval "$(fnm env)"`, `nodenv init`).
    Init,
    /// Sources a manager script (`. "$NVM_DIR/nvm.sh"`).
    Source,
    /// Adds a manager directory to PATH.
    Path,
    /// Sets a manager environment variable.
    Env,
}

/// Manager patterns: (manager, kind, regex).
const SHELL_PATTERNS: &[(&str, LineKind, &str)] = &[
    // nvm
    ("nvm", LineKind::Source, r"nvm\.sh"),
    ("nvm", LineKind::Source, r"nvm/bash_completion"),
    ("nvm", LineKind::Env, r"\bNVM_DIR\s*="),
    ("nvm", LineKind::Init, r"\bnvm\s+use\b"),
    ("nvm", LineKind::Init, r"\bload-nvmrc\b"),
    ("nvm", LineKind::Source, r"zsh-nvm"),
    ("nvm", LineKind::Source, r"plugins=\(.*\bnvm\b"),
    ("nvm", LineKind::Source, r"bass\s+source\s+.*nvm"),
    ("nvm", LineKind::Source, r"nvm\.fish"),
    // nvm-windows
    ("nvm-windows", LineKind::Env, r"\bNVM_HOME\b"),
    ("nvm-windows", LineKind::Env, r"\bNVM_SYMLINK\b"),
    // fnm
    ("fnm", LineKind::Init, r"\bfnm\s+env\b"),
    ("fnm", LineKind::Init, r"\bfnm\s+completions\b"),
    ("fnm", LineKind::Init, r"\bfnm\s+use\b"),
    ("fnm", LineKind::Env, r"\bFNM_DIR\s*="),
    ("fnm", LineKind::Path, r"\.local/share/fnm"),
    ("fnm", LineKind::Path, r"\.fnm\b"),
    // volta
    ("volta", LineKind::Env, r"\bVOLTA_HOME\b"),
    ("volta", LineKind::Path, r"\.volta/bin"),
    ("volta", LineKind::Init, r"\bvolta\s+setup\b"),
    ("volta", LineKind::Init, r"\bvolta\s+completions\b"),
    // n
    ("n", LineKind::Env, r"\bN_PREFIX\s*="),
    ("n", LineKind::Path, r"\$N_PREFIX/bin"),
    ("n", LineKind::Path, r"\$\{N_PREFIX\}/bin"),
    // asdf
    ("asdf", LineKind::Source, r"asdf\.sh"),
    ("asdf", LineKind::Source, r"asdf\.fish"),
    ("asdf", LineKind::Source, r"asdf\.nu"),
    ("asdf", LineKind::Source, r"asdf/completions"),
    ("asdf", LineKind::Env, r"\bASDF_DIR\s*="),
    ("asdf", LineKind::Env, r"\bASDF_DATA_DIR\s*="),
    ("asdf", LineKind::Path, r"asdf/shims"),
    ("asdf", LineKind::Source, r"plugins=\(.*\basdf\b"),
    // mise
    ("mise", LineKind::Init, r"\bmise\s+activate\b"),
    ("mise", LineKind::Init, r"\bmise\s+hook-env\b"),
    ("mise", LineKind::Init, r"\bmise\s+completion\b"),
    ("mise", LineKind::Init, r"\brtx\s+activate\b"),
    ("mise", LineKind::Env, r"\bMISE_DATA_DIR\s*="),
    ("mise", LineKind::Path, r"mise/shims"),
    // nodenv
    ("nodenv", LineKind::Init, r"\bnodenv\s+init\b"),
    ("nodenv", LineKind::Env, r"\bNODENV_ROOT\s*="),
    ("nodenv", LineKind::Path, r"\.nodenv/bin"),
    ("nodenv", LineKind::Path, r"\.nodenv/shims"),
    // nvs
    ("nvs", LineKind::Source, r"nvs\.sh"),
    ("nvs", LineKind::Source, r"nvs\.ps1"),
    ("nvs", LineKind::Env, r"\bNVS_HOME\s*="),
    ("nvs", LineKind::Init, r"\bnvs\s+auto\b"),
    ("nvs", LineKind::Init, r"\bnvs\s+use\b"),
    // homebrew node formulae
    ("homebrew", LineKind::Path, r"opt/node(@\d+)?/bin"),
    ("homebrew", LineKind::Path, r"brew\s+--prefix\s+node"),
    ("homebrew", LineKind::Env, r"LDFLAGS=.*opt/node@\d+"),
    ("homebrew", LineKind::Env, r"CPPFLAGS=.*opt/node@\d+"),
];

static COMPILED_PATTERNS: LazyLock<Vec<(&'static str, LineKind, Regex)>> = LazyLock::new(|| {
    SHELL_PATTERNS
        .iter()
        .map(|(manager, kind, pattern)| {
            (
                *manager,
                *kind,
                Regex::new(pattern).expect("Invalid shell pattern"),
            )
        })
        .collect()
});

/// Command substitution evaluated at startup (`eval "$(...)"`, `| source`,
/// `Invoke-Expression`).
static EAGER_EVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"eval\s+"?\$\(|\|\s*source\b|Invoke-Expression|\biex\b"#).expect("Invalid regex")
});

/// One manager reference in a shell file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellFinding {
    pub file: PathBuf,
    /// 1-based line number.
    pub line_number: usize,
    pub manager: String,
    pub kind: LineKind,
    /// The trimmed line.
    pub line: String,
    /// The line evaluates a command's output at startup.
    pub eager: bool,
}

/// Result of scanning all shell files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShellScan {
    /// Files that existed and were read.
    pub files_scanned: Vec<PathBuf>,
    pub findings: Vec<ShellFinding>,
}

impl ShellScan {
    /// Distinct managers referenced, in first-seen order.
    pub fn managers(&self) -> Vec<String> {
        let mut managers: Vec<String> = Vec::new();
        for finding in &self.findings {
            if !managers.contains(&finding.manager) {
                managers.push(finding.manager.clone());
            }
        }
        managers
    }

    /// Distinct managers referenced by one file.
    pub fn managers_in(&self, file: &Path) -> Vec<String> {
        let mut managers: Vec<String> = Vec::new();
        for finding in self.findings.iter().filter(|f| f.file == file) {
            if !managers.contains(&finding.manager) {
                managers.push(finding.manager.clone());
            }
        }
        managers
    }
}

/// Scan one file's content.
///
/// A line yields at most one finding per manager.
pub fn scan_content(file: &Path, content: &str) -> Vec<ShellFinding> {
    let mut findings = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut matched: Vec<&str> = Vec::new();
        for (manager, kind, regex) in COMPILED_PATTERNS.iter() {
            if matched.contains(manager) || !regex.is_match(line) {
                continue;
            }
            matched.push(manager);
            findings.push(ShellFinding {
                file: file.to_path_buf(),
                line_number: idx + 1,
                manager: manager.to_string(),
                kind: *kind,
                line: line.to_string(),
                eager: *kind == LineKind::Init && EAGER_EVAL.is_match(line),
            });
        }
    }
    findings
}

/// Scan every known shell file under the home directory.
pub fn scan_shell_configs(env: &HostEnv) -> ShellScan {
    let mut scan = ShellScan::default();
    for rel in SHELL_FILES {
        let path = env.home_join(rel);
        let Some(content) = read_optional(&path) else {
            continue;
        };
        tracing::debug!("Scanning {}", path.display());
        scan.findings.extend(scan_content(&path, &content));
        scan.files_scanned.push(path);
    }
    scan
}

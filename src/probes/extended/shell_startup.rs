//! Shell startup cost heuristics built on the shell-config scan.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::probes::shell_config::{LineKind, ShellFinding, ShellScan};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShellStartup {
    /// `eval "$(... init ...)"` style initialisers.
    pub eager_inits: Vec<ShellFinding>,
    /// Files that initialise more than one manager.
    pub multi_manager_files: Vec<PathBuf>,
    /// nvm sourced without `--no-use`.
    pub nvm_without_no_use: Vec<ShellFinding>,
}

impl ShellStartup {
    pub fn is_slow(&self) -> bool {
        !self.eager_inits.is_empty()
            || !self.multi_manager_files.is_empty()
            || !self.nvm_without_no_use.is_empty()
    }
}

pub fn check_shell_startup(scan: &ShellScan) -> ShellStartup {
    let eager_inits = scan.findings.iter().filter(|f| f.eager).cloned().collect();

    let multi_manager_files = scan
        .files_scanned
        .iter()
        .filter(|file| scan.managers_in(file).len() > 1)
        .cloned()
        .collect();

    let nvm_without_no_use = scan
        .findings
        .iter()
        .filter(|f| {
            f.manager == "nvm"
                && f.kind == LineKind::Source
                && f.line.contains("nvm.sh")
                && !f.line.contains("--no-use")
        })
        .cloned()
        .collect();

    ShellStartup {
        eager_inits,
        multi_manager_files,
        nvm_without_no_use,
    }
}

//! Toolchain needed to compile native addons (node-gyp).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::platform::Platform;
use crate::sys::command;

const VSWHERE: &str = "C:\\Program Files (x86)\\Microsoft Visual Studio\\Installer\\vswhere.exe";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeBuildTools {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    /// Visual Studio build tools (Windows only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_studio: Option<String>,
    pub ready: bool,
}

impl NativeBuildTools {
    /// Names of the missing pieces.
    pub fn missing(&self, platform: Platform) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.python.is_none() {
            missing.push("python");
        }
        if platform.is_windows() {
            if self.visual_studio.is_none() {
                missing.push("Visual Studio build tools");
            }
        } else {
            if self.compiler.is_none() {
                missing.push("C/C++ compiler");
            }
            if self.make.is_none() {
                missing.push("make");
            }
        }
        missing
    }
}

fn first_answer(candidates: &[&str], args: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find_map(|program| command::run(program, args))
        .and_then(|out| {
            out.first_line()
                .or_else(|| out.stderr.lines().next().map(|l| l.trim().to_string()))
        })
}

/// Probe python, a C/C++ compiler and make (or Visual Studio on Windows).
pub fn probe_native_build(platform: Platform) -> NativeBuildTools {
    let python = first_answer(&["python3", "python"], &["--version"]);
    let mut tools = NativeBuildTools {
        python,
        ..Default::default()
    };

    if platform.is_windows() {
        if Path::new(VSWHERE).is_file() {
            tools.visual_studio = command::run_line(VSWHERE, &["-latest", "-property", "installationPath"])
                .filter(|p| !p.is_empty());
        }
    } else {
        tools.compiler = first_answer(&["c++", "g++", "clang++", "cc"], &["--version"]);
        tools.make = first_answer(&["make", "gmake"], &["--version"]);
    }
    tools.ready = tools.missing(platform).is_empty();
    tools
}

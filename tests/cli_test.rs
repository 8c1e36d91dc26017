//! Integration tests for the node-doctor binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MANAGER_VARS: &[&str] = &[
    "NVM_DIR", "FNM_DIR", "VOLTA_HOME", "N_PREFIX", "ASDF_DATA_DIR", "MISE_DATA_DIR",
    "NODENV_ROOT", "NVS_HOME", "NODE_PATH", "NODE_OPTIONS", "NPM_CONFIG_PREFIX",
    "npm_config_prefix", "npm_config_registry", "RUST_LOG",
];

/// A sandbox with its own HOME and an empty PATH.
struct Sandbox {
    home: TempDir,
    bin: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
            bin: TempDir::new().unwrap(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("node-doctor"));
        cmd.current_dir(self.home.path())
            .env("HOME", self.home.path())
            .env("PATH", self.bin.path())
            .env("NO_COLOR", "1");
        for var in MANAGER_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    fn install(&self, rel_root: &str) {
        let root = self.home.path().join(rel_root);
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(root.join("bin/node"), vec![0u8; 512]).unwrap();
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.home.path().join(rel);
        if let Some(parent) = Path::new(&path).parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

fn feed_server() -> MockServer {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(Method::HEAD).path("/");
        then.status(200);
    });
    server.mock(|when, then| {
        when.method(GET).path("/schedule.json");
        then.status(200).json_body(serde_json::json!({
            "v20": {"start": "2023-04-18", "maintenance": "2024-10-22", "end": "2026-04-30"}
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/index.json");
        then.status(404);
    });
    server
}

fn with_feeds(cmd: &mut Command, server: &MockServer) {
    cmd.env("NODE_DOCTOR_REGISTRY_URL", server.url("/"))
        .env("NODE_DOCTOR_SCHEDULE_URL", server.url("/schedule.json"))
        .env("NODE_DOCTOR_DIST_INDEX_URL", server.url("/index.json"));
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("node-doctor"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Node.js toolchain"))
        .stdout(predicate::str::contains("duplicates"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("node-doctor"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_rejects_unknown_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("node-doctor"));
    cmd.arg("fix");
    cmd.assert().failure().code(2);
    Ok(())
}

#[test]
fn cli_generates_completions() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = Sandbox::new();
    sandbox
        .command()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("node-doctor"));
    Ok(())
}

#[test]
fn cli_malformed_config_exits_two() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = Sandbox::new();
    sandbox.write(".node-doctor.yml", "skip_ports: [");
    sandbox
        .command()
        .arg("list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse config"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_list_shows_managed_installations() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = Sandbox::new();
    sandbox.install(".nvm/versions/node/v20.11.0");
    sandbox.install(".nvm/versions/node/v18.19.0");

    let output = sandbox.command().args(["list", "--json"]).output()?;
    assert!(output.status.success());

    let items: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let nvm: Vec<&serde_json::Value> = items
        .as_array()
        .unwrap()
        .iter()
        .filter(|i| i["detector_name"] == "nvm")
        .collect();
    assert_eq!(nvm.len(), 2);
    assert_eq!(nvm[0]["version"], "20.11.0");
    assert_eq!(nvm[1]["version"], "18.19.0");
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_duplicates_reports_shared_version() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = Sandbox::new();
    sandbox.install(".nvm/versions/node/v20.11.0");
    sandbox.install(".local/share/fnm/node-versions/v20.11.0/installation");

    sandbox
        .command()
        .arg("duplicates")
        .assert()
        .success()
        .stdout(predicate::str::contains("v20.11.0  nvm, fnm"))
        .stdout(predicate::str::contains("1 duplicate version(s)"));
    Ok(())
}

#[test]
fn cli_doctor_without_runtime_exits_one() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = Sandbox::new();
    let server = feed_server();

    let mut cmd = sandbox.command();
    cmd.args(["doctor", "--skip-ports", "--skip-shell", "--json"]);
    with_feeds(&mut cmd, &server);
    let output = cmd.output()?;

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["overall_status"], "fail");
    assert_eq!(report["exit_code"], 1);
    let checks = report["checks"].as_array().unwrap();
    let node = checks.iter().find(|c| c["id"] == "node-in-path").unwrap();
    assert_eq!(node["status"], "fail");
    let registry = checks.iter().find(|c| c["id"] == "npm-registry").unwrap();
    assert_eq!(registry["status"], "pass");
    assert!(report["data"]["ports"].is_null());
    Ok(())
}

#[test]
fn cli_doctor_text_is_one_line_per_check() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = Sandbox::new();
    let server = feed_server();

    let mut cmd = sandbox.command();
    cmd.env("NODE_DOCTOR_SKIP_PORTS", "1")
        .env("NODE_DOCTOR_SKIP_SHELL", "1");
    with_feeds(&mut cmd, &server);
    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("✗ FAIL node-in-path:"))
        .stdout(predicate::str::contains("✓ PASS npm-registry:"))
        .stdout(predicate::str::is_match(r"\d+ checks: \d+ passed, \d+ warnings, \d+ failed \(fail\)")?);
    Ok(())
}

#[test]
fn cli_project_config_applies() -> Result<(), Box<dyn std::error::Error>> {
    let sandbox = Sandbox::new();
    let server = feed_server();
    sandbox.write(
        ".node-doctor.yml",
        &format!(
            "registry_url: {}\nschedule_url: {}\ndist_index_url: {}\nskip_ports: true\nskip_shell: true\n",
            server.url("/"),
            server.url("/schedule.json"),
            server.url("/index.json")
        ),
    );

    let output = sandbox.command().args(["doctor", "--json"]).output()?;
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["data"]["registry_config"]["source"], "config");
    assert!(report["data"]["shell"].is_null());
    Ok(())
}

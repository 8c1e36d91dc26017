//! Listening-port scan for JavaScript runtime processes.
//!
//! Uses `lsof` on unix and `netstat -ano` plus `tasklist` on Windows.
//! Only processes whose command looks like a runtime or dev server are
//! reported.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::platform::Platform;
use crate::sys::command;

/// Commands treated as JavaScript runtimes or their dev servers.
pub const RUNTIME_COMMANDS: &[&str] = &[
    "node", "nodejs", "npm", "npx", "yarn", "pnpm", "bun", "deno", "tsx", "ts-node", "nodemon",
    "next-server", "vite", "webpack", "esbuild", "pm2",
];

/// A runtime process holding a listening socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortProcess {
    pub port: u16,
    pub pid: u32,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Whether a process command qualifies, case-insensitively.
pub fn is_runtime_command(command: &str) -> bool {
    let lower = command.to_lowercase();
    let base = lower.trim_end_matches(".exe");
    RUNTIME_COMMANDS.contains(&base) || lower.contains("node")
}

fn split_address(addr: &str) -> Option<(String, u16)> {
    let (host, port) = addr.rsplit_once(':')?;
    Some((host.to_string(), port.parse().ok()?))
}

/// Parse `lsof -nP +c 0 -iTCP -sTCP:LISTEN` output.
pub fn parse_lsof(output: &str) -> Vec<PortProcess> {
    let mut found: Vec<PortProcess> = Vec::new();
    for line in output.lines().skip(1) {
        let cols: Vec<&str> = line.split_whitespace().collect();
        // COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME (LISTEN)
        if cols.len() < 9 {
            continue;
        }
        let command = cols[0].replace("\\x20", " ");
        let Ok(pid) = cols[1].parse::<u32>() else {
            continue;
        };
        let Some((address, port)) = split_address(cols[8]) else {
            continue;
        };
        if !is_runtime_command(&command) {
            continue;
        }
        // IPv4 and IPv6 sockets of the same process show up twice
        if found.iter().any(|p| p.pid == pid && p.port == port) {
            continue;
        }
        found.push(PortProcess {
            port,
            pid,
            command,
            address: Some(address),
        });
    }
    found
}

/// Parse `tasklist /FO CSV /NH` output into pid → image name.
pub fn parse_tasklist(output: &str) -> HashMap<u32, String> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split("\",\"").map(|f| f.trim_matches('"')).collect();
            let name = fields.first()?.to_string();
            let pid = fields.get(1)?.parse().ok()?;
            Some((pid, name))
        })
        .collect()
}

/// Parse `netstat -ano` output, keeping listening TCP sockets whose pid
/// maps to a runtime image.
pub fn parse_netstat(output: &str, images: &HashMap<u32, String>) -> Vec<PortProcess> {
    let mut found: Vec<PortProcess> = Vec::new();
    for line in output.lines() {
        let cols: Vec<&str> = line.split_whitespace().collect();
        // Proto Local Foreign State PID
        if cols.len() < 5 || !cols[0].eq_ignore_ascii_case("TCP") || cols[3] != "LISTENING" {
            continue;
        }
        let Some((address, port)) = split_address(cols[1]) else {
            continue;
        };
        let Ok(pid) = cols[4].parse::<u32>() else {
            continue;
        };
        let Some(image) = images.get(&pid) else {
            continue;
        };
        if !is_runtime_command(image) || found.iter().any(|p| p.pid == pid && p.port == port) {
            continue;
        }
        found.push(PortProcess {
            port,
            pid,
            command: image.clone(),
            address: Some(address),
        });
    }
    found
}

/// Listening TCP sockets; `+c 0` keeps lsof from cutting command names to 9 chars.
const LSOF_ARGS: &[&str] = &["-nP", "+c", "0", "-iTCP", "-sTCP:LISTEN"];

/// Scan listening sockets. Missing tools yield an empty list.
pub fn scan_ports(platform: Platform) -> Vec<PortProcess> {
    let mut found = if platform.is_windows() {
        let images = command::run("tasklist", &["/FO", "CSV", "/NH"])
            .map(|o| parse_tasklist(&o.stdout))
            .unwrap_or_default();
        command::run("netstat", &["-ano"])
            .map(|o| parse_netstat(&o.stdout, &images))
            .unwrap_or_default()
    } else {
        command::run("lsof", LSOF_ARGS)
            .map(|o| parse_lsof(&o.stdout))
            .unwrap_or_default()
    };
    found.sort_by_key(|p| (p.port, p.pid));
    tracing::debug!("Found {} runtime process(es) on ports", found.len());
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_dictionary_is_case_insensitive() {
        assert!(is_runtime_command("node"));
        assert!(is_runtime_command("Node.exe"));
        assert!(is_runtime_command("VITE"));
        assert!(is_runtime_command("MainThread-node-worker"));
        assert!(!is_runtime_command("postgres"));
        assert!(!is_runtime_command("nginx"));
    }

    #[test]
    fn lsof_reports_full_command_names() {
        let pos = LSOF_ARGS.iter().position(|a| *a == "+c").unwrap();
        assert_eq!(LSOF_ARGS[pos + 1], "0");

        // Truncated to 9 chars this would read `MainThrea` and be dropped.
        let output = "\
COMMAND                  PID USER   FD   TYPE DEVICE SIZE/OFF NODE NAME
MainThread-node-worker  5150 dev   21u  IPv4 0x2222      0t0  TCP 127.0.0.1:5173 (LISTEN)
";
        let found = parse_lsof(output);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].command, "MainThread-node-worker");
        assert_eq!(found[0].port, 5173);
    }

    #[test]
    fn parses_lsof_and_filters_non_runtimes() {
        let output = "\
COMMAND   PID USER   FD   TYPE DEVICE SIZE/OFF NODE NAME
node    4242 dev   23u  IPv4 0x1234      0t0  TCP 127.0.0.1:3000 (LISTEN)
node    4242 dev   24u  IPv6 0x1235      0t0  TCP [::1]:3000 (LISTEN)
postgres 99 dev    5u  IPv4 0x9999      0t0  TCP *:5432 (LISTEN)
bun     777 dev    9u  IPv4 0x1111      0t0  TCP *:8080 (LISTEN)
";
        let procs = parse_lsof(output);
        assert_eq!(procs.len(), 2);
        assert_eq!(procs[0].port, 3000);
        assert_eq!(procs[0].pid, 4242);
        assert_eq!(procs[0].address.as_deref(), Some("127.0.0.1"));
        assert_eq!(procs[1].command, "bun");
    }

    #[test]
    fn parses_netstat_with_tasklist() {
        let tasklist = "\"node.exe\",\"1200\",\"Console\",\"1\",\"45,000 K\"\n\"svchost.exe\",\"800\",\"Services\",\"0\",\"10,000 K\"\n";
        let netstat = "\
  Proto  Local Address          Foreign Address        State           PID
  TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       800
  TCP    127.0.0.1:5173         0.0.0.0:0              LISTENING       1200
  TCP    127.0.0.1:5173         127.0.0.1:50000        ESTABLISHED     1200
";
        let images = parse_tasklist(tasklist);
        assert_eq!(images.get(&1200).map(String::as_str), Some("node.exe"));

        let procs = parse_netstat(netstat, &images);
        assert_eq!(procs.len(), 1);
        assert_eq!(procs[0].port, 5173);
        assert_eq!(procs[0].command, "node.exe");
    }
}

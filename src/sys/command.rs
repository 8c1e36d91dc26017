//! Bounded-time subprocess execution.
//!
//! Probes shell out to `node`, `npm`, `lsof` and friends. A missing tool,
//! a nonzero exit and a timeout all mean the same thing to a probe ("no
//! answer"), so [`run`] returns `None` for all three instead of an error.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

/// Default timeout for probe subprocesses.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured output of a successful command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Execution duration.
    pub duration: Duration,
}

impl CommandOutput {
    /// First non-empty line of stdout, trimmed.
    pub fn first_line(&self) -> Option<String> {
        self.stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(String::from)
    }
}

/// Options for a probe command.
#[derive(Debug, Clone)]
pub struct RunOptions<'a> {
    /// Working directory.
    pub cwd: Option<&'a Path>,
    /// Kill the process after this long.
    pub timeout: Duration,
}

impl Default for RunOptions<'_> {
    fn default() -> Self {
        Self {
            cwd: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Run a program with the default timeout.
pub fn run(program: &str, args: &[&str]) -> Option<CommandOutput> {
    run_with(program, args, &RunOptions::default())
}

/// Run a program and return the first line of its stdout.
pub fn run_line(program: &str, args: &[&str]) -> Option<String> {
    run(program, args)?.first_line()
}

/// Run a program with explicit options.
///
/// Returns `None` if the program cannot be spawned, exits nonzero, or does
/// not finish within the timeout. On timeout the whole process group is
/// killed and the call returns without waiting for the pipes to close.
pub fn run_with(program: &str, args: &[&str], options: &RunOptions<'_>) -> Option<CommandOutput> {
    let start = Instant::now();

    let mut child = match spawn(program, args, options.cwd) {
        Ok(child) => child,
        Err(e) => {
            tracing::debug!("Failed to spawn {}: {}", program, e);
            return None;
        }
    };

    // Drain pipes on separate threads so a chatty child cannot block on a full pipe
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_rx = drain(stdout);
    let stderr_rx = drain(stderr);

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if start.elapsed() >= options.timeout => {
                tracing::debug!("{} timed out after {:?}", program, options.timeout);
                kill_tree(&mut child);
                // Descendants may still hold the pipes open; leave the readers detached.
                return None;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                tracing::debug!("Failed waiting on {}: {}", program, e);
                kill_tree(&mut child);
                return None;
            }
        }
    };

    // The pipes close once every holder exits, which may be later than the child.
    let deadline = start + options.timeout;
    let (Some(stdout), Some(stderr)) = (collect(&stdout_rx, deadline), collect(&stderr_rx, deadline))
    else {
        tracing::debug!("{} left its output pipes open past {:?}", program, options.timeout);
        kill_group(child.id());
        return None;
    };

    if status.success() {
        Some(CommandOutput {
            stdout,
            stderr,
            duration: start.elapsed(),
        })
    } else {
        tracing::debug!("{} {:?} exited with {:?}", program, args, status.code());
        None
    }
}

/// Kill the child and everything in its process group.
fn kill_tree(child: &mut Child) {
    kill_group(child.id());
    let _ = child.kill();
    let _ = child.wait();
}

/// Children lead their own process group (see `spawn`), so the group id is the child's pid.
#[cfg(unix)]
fn kill_group(pid: u32) {
    if let Ok(pgid) = libc::pid_t::try_from(pid) {
        // SAFETY: kill(2) takes no pointers; a negative pid addresses the group.
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}

fn spawn(program: &str, args: &[&str], cwd: Option<&Path>) -> std::io::Result<Child> {
    let build = |name: &str| {
        let mut cmd = Command::new(name);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    };

    match build(program).spawn() {
        // npm, yarn, pnpm and corepack ship as .cmd shims on Windows
        Err(e) if cfg!(windows) && e.kind() == std::io::ErrorKind::NotFound => {
            build(&format!("{}.cmd", program)).spawn()
        }
        other => other,
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(read_pipe(pipe));
    });
    rx
}

fn collect(rx: &Receiver<String>, deadline: Instant) -> Option<String> {
    rx.recv_timeout(deadline.saturating_duration_since(Instant::now())).ok()
}

fn read_pipe<R: Read>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn captures_stdout_of_successful_command() {
        let output = run("sh", &["-c", "echo hello"]).unwrap();
        assert_eq!(output.first_line(), Some("hello".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_none() {
        assert!(run("sh", &["-c", "exit 3"]).is_none());
    }

    #[test]
    fn missing_program_is_none() {
        assert!(run("node-doctor-definitely-not-a-program", &[]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_and_returns_none() {
        let options = RunOptions {
            cwd: None,
            timeout: Duration::from_millis(100),
        };
        let start = Instant::now();
        assert!(run_with("sh", &["-c", "sleep 5"], &options).is_none());
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_does_not_wait_for_background_children() {
        let options = RunOptions {
            cwd: None,
            timeout: Duration::from_millis(100),
        };
        let start = Instant::now();
        assert!(run_with("sh", &["-c", "sleep 5 & sleep 5 & wait"], &options).is_none());
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_does_not_wait_for_detached_grandchildren() {
        // The grandchild leaves the process group but keeps stdout open.
        let options = RunOptions {
            cwd: None,
            timeout: Duration::from_millis(100),
        };
        let script = "if command -v setsid >/dev/null; then setsid sleep 5 & fi; sleep 5";
        let start = Instant::now();
        assert!(run_with("sh", &["-c", script], &options).is_none());
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn exited_child_with_lingering_pipe_holder_is_bounded() {
        let options = RunOptions {
            cwd: None,
            timeout: Duration::from_millis(300),
        };
        let start = Instant::now();
        assert!(run_with("sh", &["-c", "sleep 5 & echo started"], &options).is_none());
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_working_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let options = RunOptions {
            cwd: Some(temp.path()),
            ..Default::default()
        };
        let output = run_with("pwd", &[], &options).unwrap();
        let reported = std::path::PathBuf::from(output.first_line().unwrap());
        assert_eq!(
            std::fs::canonicalize(reported).unwrap(),
            std::fs::canonicalize(temp.path()).unwrap()
        );
    }

    #[test]
    fn first_line_skips_blank_lines() {
        let output = CommandOutput {
            stdout: "\n\n  v20.11.0\nmore\n".to_string(),
            stderr: String::new(),
            duration: Duration::ZERO,
        };
        assert_eq!(output.first_line(), Some("v20.11.0".to_string()));
    }
}

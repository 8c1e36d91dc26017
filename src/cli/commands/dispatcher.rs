//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandContext`] for state every command shares
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, DoctorArgs};
use crate::config::{load_config, DoctorConfig};
use crate::detectors::DetectorRegistry;
use crate::error::Result;
use crate::platform::HostEnv;
use crate::report::{self, OutputFormat, ReportFormatter};
use crate::ui::UserInterface;

/// Exit code for fatal errors (bad config, bad detector registration).
pub const EXIT_FATAL: i32 = 2;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, writing its report through `ui`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Everything a command needs besides its own arguments.
pub struct CommandContext {
    pub env: HostEnv,
    pub config: DoctorConfig,
    pub registry: DetectorRegistry,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Formatter for the selected output format.
    pub fn formatter(&self, ui: &dyn UserInterface) -> Box<dyn ReportFormatter> {
        report::formatter(self.format, ui.theme())
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    env: HostEnv,
}

impl CommandDispatcher {
    /// Create a dispatcher over the real process environment.
    pub fn new(project_root: PathBuf) -> Self {
        Self::with_env(project_root, HostEnv::from_process())
    }

    /// Create a dispatcher over a prepared environment.
    pub fn with_env(project_root: PathBuf, mut env: HostEnv) -> Self {
        env.cwd = project_root.clone();
        Self { project_root, env }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    fn context(&self, cli: &Cli) -> Result<CommandContext> {
        let config = load_config(&self.env, &self.project_root, cli.config.as_deref())?;
        tracing::debug!("Resolved config: {:?}", config);
        Ok(CommandContext {
            env: self.env.clone(),
            config,
            registry: DetectorRegistry::with_builtins()?,
            format: cli.output_format(),
        })
    }

    /// Dispatch and execute a command.
    ///
    /// Config and detector registration errors are returned as `Err`.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if let Some(Commands::Completions(args)) = &cli.command {
            return super::completions::CompletionsCommand::new(args.clone()).execute(ui);
        }

        let ctx = self.context(cli)?;
        match &cli.command {
            Some(Commands::Doctor(args)) => {
                super::doctor::DoctorCommand::new(&ctx, args.clone()).execute(ui)
            }
            Some(Commands::List(args)) => {
                super::list::ListCommand::new(&ctx, args.clone()).execute(ui)
            }
            Some(Commands::Duplicates) => super::duplicates::DuplicatesCommand::new(&ctx).execute(ui),
            Some(Commands::Completions(_)) => Ok(CommandResult::success()),
            None => super::doctor::DoctorCommand::new(&ctx, DoctorArgs::default()).execute(ui),
        }
    }
}

//! Command-line interface for node-doctor.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CompletionsArgs, DoctorArgs, ListArgs};
pub use commands::{Command, CommandContext, CommandDispatcher, CommandResult, EXIT_FATAL};

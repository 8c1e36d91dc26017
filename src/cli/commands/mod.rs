//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which loads the
//! configuration and the detector registry once and hands both to the
//! selected command through a [`CommandContext`].

pub mod completions;
pub mod dispatcher;
pub mod doctor;
pub mod duplicates;
pub mod list;

pub use dispatcher::{Command, CommandContext, CommandDispatcher, CommandResult, EXIT_FATAL};

//! Filesystem and subprocess collaborators.
//!
//! - [`fs`] - Existence, sizing and listing helpers that treat absence as data
//! - [`command`] - Bounded-time subprocess runner that returns `None` on failure

pub mod command;
pub mod fs;

pub use command::{run, run_line, run_with, CommandOutput, RunOptions, DEFAULT_TIMEOUT};
pub use fs::{dir_size, human_size, is_executable, is_within, list_dirs, read_first_line, real_path};

//! Terminal output.
//!
//! - [`UserInterface`] trait for output abstraction
//! - [`TerminalUI`] writing reports to stdout and diagnostics to stderr
//! - [`MockUI`] capturing everything for tests

pub mod mock;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, DoctorTheme};

use std::io::Write;

/// Trait for user interface interactions.
///
/// Reports go to [`UserInterface::out`]; warnings and errors never mix
/// with them so JSON output stays parseable.
pub trait UserInterface {
    /// Theme used for text rendering.
    fn theme(&self) -> &DoctorTheme;

    /// Destination for report output.
    fn out(&mut self) -> &mut dyn Write;

    /// Display a warning.
    fn warning(&mut self, msg: &str);

    /// Display an error.
    fn error(&mut self, msg: &str);
}

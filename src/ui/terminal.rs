//! Terminal UI.

use console::Term;
use std::io::{self, Write};

use super::{DoctorTheme, UserInterface};

/// Writes reports to stdout and diagnostics to stderr.
pub struct TerminalUI {
    stdout: io::Stdout,
    stderr: Term,
    theme: DoctorTheme,
}

impl TerminalUI {
    pub fn new(no_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            stderr: Term::stderr(),
            theme: DoctorTheme::detect(no_color),
        }
    }
}

impl UserInterface for TerminalUI {
    fn theme(&self) -> &DoctorTheme {
        &self.theme
    }

    fn out(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }

    fn warning(&mut self, msg: &str) {
        writeln!(self.stderr, "{}", self.theme.format_warning(msg)).ok();
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.stderr, "{}", self.theme.format_error(msg)).ok();
    }
}

//! Mock UI implementation for testing.
//!
//! # Example
//!
//! ```
//! use node_doctor::ui::{MockUI, UserInterface};
//! use std::io::Write;
//!
//! let mut ui = MockUI::new();
//! writeln!(ui.out(), "report").unwrap();
//! ui.warning("slow registry");
//!
//! assert_eq!(ui.output(), "report\n");
//! assert_eq!(ui.warnings(), ["slow registry"]);
//! ```

use std::io::Write;

use super::{DoctorTheme, UserInterface};

/// Captures output, warnings and errors for assertion.
#[derive(Debug)]
pub struct MockUI {
    theme: DoctorTheme,
    buffer: Vec<u8>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl Default for MockUI {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUI {
    /// Create a mock with the plain theme.
    pub fn new() -> Self {
        Self {
            theme: DoctorTheme::plain(),
            buffer: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Everything written to [`UserInterface::out`].
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl UserInterface for MockUI {
    fn theme(&self) -> &DoctorTheme {
        &self.theme
    }

    fn out(&mut self) -> &mut dyn Write {
        &mut self.buffer
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }
}

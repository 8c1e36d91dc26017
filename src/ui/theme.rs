//! Visual theme and styling.

use console::Style;

use crate::health::CheckStatus;

/// node-doctor's visual theme.
#[derive(Debug, Clone)]
pub struct DoctorTheme {
    /// Passing checks (green).
    pub pass: Style,
    /// Warnings (orange).
    pub warn: Style,
    /// Failures (red bold).
    pub fail: Style,
    /// Secondary text such as paths and sizes.
    pub dim: Style,
    /// Section headers (bold).
    pub header: Style,
    /// Remediation hints (magenta dim).
    pub hint: Style,
    /// Check identifiers and manager names (bold).
    pub key: Style,
}

impl Default for DoctorTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl DoctorTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            pass: Style::new().green(),
            warn: Style::new().color256(208),
            fail: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold(),
            hint: Style::new().magenta().dim(),
            key: Style::new().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY, `--no-color` or JSON).
    pub fn plain() -> Self {
        Self {
            pass: Style::new(),
            warn: Style::new(),
            fail: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            hint: Style::new(),
            key: Style::new(),
        }
    }

    /// Pick the theme for the current terminal.
    pub fn detect(no_color: bool) -> Self {
        if !no_color && should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    pub fn status_style(&self, status: CheckStatus) -> &Style {
        match status {
            CheckStatus::Pass => &self.pass,
            CheckStatus::Warn => &self.warn,
            CheckStatus::Fail => &self.fail,
        }
    }

    /// Icon and upper-case label for a status, styled.
    pub fn format_status(&self, status: CheckStatus) -> String {
        let label = match status {
            CheckStatus::Pass => "✓ PASS",
            CheckStatus::Warn => "⚠ WARN",
            CheckStatus::Fail => "✗ FAIL",
        };
        format!("{}", self.status_style(status).apply_to(label))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warn.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.fail.apply_to(format!("✗ {}", msg)))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    console::Term::stdout().is_term()
}

//! Report formatters.
//!
//! Renders assessments, installation lists and duplicate sets as
//! line-oriented text or JSON.

pub mod json;
pub mod text;

use std::io::{self, Write};

use crate::aggregate::{AggregatedInstallation, DuplicateVersion};
use crate::health::Assessment;
use crate::ui::DoctorTheme;

pub use json::JsonFormatter;
pub use text::TextFormatter;

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Trait for rendering reports.
pub trait ReportFormatter {
    fn assessment(&self, assessment: &Assessment, writer: &mut dyn Write) -> io::Result<()>;

    fn installations(
        &self,
        installations: &[AggregatedInstallation],
        writer: &mut dyn Write,
    ) -> io::Result<()>;

    fn duplicates(&self, duplicates: &[DuplicateVersion], writer: &mut dyn Write)
        -> io::Result<()>;
}

/// Formatter for `format`. JSON ignores the theme.
pub fn formatter(format: OutputFormat, theme: &DoctorTheme) -> Box<dyn ReportFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(theme.clone())),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

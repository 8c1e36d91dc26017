//! Line-oriented text output.
//!
//! Output depends only on the input: one line per check, installation or
//! duplicate set, followed by a summary line. No timestamps.

use std::io::{self, Write};

use super::ReportFormatter;
use crate::aggregate::{total_reclaimable, AggregatedInstallation, DuplicateVersion};
use crate::health::Assessment;
use crate::sys::fs::human_size;
use crate::ui::DoctorTheme;

/// Formats reports for human consumption.
pub struct TextFormatter {
    theme: DoctorTheme,
}

impl TextFormatter {
    pub fn new(theme: DoctorTheme) -> Self {
        Self { theme }
    }

    /// Formatter without colors.
    pub fn plain() -> Self {
        Self::new(DoctorTheme::plain())
    }
}

impl ReportFormatter for TextFormatter {
    fn assessment(&self, assessment: &Assessment, writer: &mut dyn Write) -> io::Result<()> {
        for check in &assessment.checks {
            write!(
                writer,
                "{} {}: {}",
                self.theme.format_status(check.status),
                self.theme.key.apply_to(&check.id),
                check.message
            )?;
            if let Some(hint) = &check.hint {
                write!(writer, " {}", self.theme.hint.apply_to(format!("(hint: {})", hint)))?;
            }
            writeln!(writer)?;
        }

        let s = &assessment.summary;
        writeln!(writer)?;
        writeln!(
            writer,
            "{} checks: {} passed, {} warnings, {} failed ({})",
            s.total,
            s.passed,
            s.warnings,
            s.failed,
            self.theme
                .status_style(assessment.overall_status)
                .apply_to(assessment.overall_status)
        )
    }

    fn installations(
        &self,
        installations: &[AggregatedInstallation],
        writer: &mut dyn Write,
    ) -> io::Result<()> {
        if installations.is_empty() {
            return writeln!(writer, "No installations found");
        }

        let width = installations
            .iter()
            .map(|i| i.detector_name.len())
            .max()
            .unwrap_or(0);
        let mut total = 0;
        for item in installations {
            let inst = &item.installation;
            total += inst.size;
            writeln!(
                writer,
                "{:<width$}  v{:<10}  {:>9}  {}",
                item.detector_name,
                crate::version::normalize(&inst.version),
                human_size(inst.size),
                self.theme.dim.apply_to(inst.path.display()),
                width = width
            )?;
        }
        writeln!(writer)?;
        writeln!(
            writer,
            "{} installation(s), {}",
            installations.len(),
            human_size(total)
        )
    }

    fn duplicates(
        &self,
        duplicates: &[DuplicateVersion],
        writer: &mut dyn Write,
    ) -> io::Result<()> {
        if duplicates.is_empty() {
            return writeln!(writer, "No duplicate versions");
        }
        for dup in duplicates {
            writeln!(
                writer,
                "v{}  {}  {} (reclaim ~{})",
                dup.version,
                self.theme.key.apply_to(dup.managers.join(", ")),
                human_size(dup.total_size),
                human_size(dup.reclaimable_bytes())
            )?;
        }
        writeln!(writer)?;
        writeln!(
            writer,
            "{} duplicate version(s), ~{} reclaimable",
            duplicates.len(),
            human_size(total_reclaimable(duplicates))
        )
    }
}

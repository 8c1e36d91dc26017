//! JSON output.

use serde::Serialize;
use std::io::{self, Write};

use super::ReportFormatter;
use crate::aggregate::{total_reclaimable, AggregatedInstallation, DuplicateVersion};
use crate::health::Assessment;

/// Formats reports as JSON documents.
pub struct JsonFormatter {
    pretty: bool,
}

#[derive(Serialize)]
struct DuplicateReport<'a> {
    duplicates: &'a [DuplicateVersion],
    total_reclaimable: u64,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn write<T: Serialize + ?Sized>(&self, value: &T, writer: &mut dyn Write) -> io::Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

impl ReportFormatter for JsonFormatter {
    fn assessment(&self, assessment: &Assessment, writer: &mut dyn Write) -> io::Result<()> {
        self.write(assessment, writer)
    }

    fn installations(
        &self,
        installations: &[AggregatedInstallation],
        writer: &mut dyn Write,
    ) -> io::Result<()> {
        self.write(installations, writer)
    }

    fn duplicates(
        &self,
        duplicates: &[DuplicateVersion],
        writer: &mut dyn Write,
    ) -> io::Result<()> {
        self.write(
            &DuplicateReport {
                duplicates,
                total_reclaimable: total_reclaimable(duplicates),
            },
            writer,
        )
    }
}

//! JSON export of aggregate statistics

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use docbench_core::{RunSummary, SessionTotals};
use serde::Serialize;
use tracing::info;

use crate::ReportResult;

/// Document written by [`JsonExporter::export_summary`]
#[derive(Debug, Serialize)]
struct SummaryDocument<'a> {
    generated_at: DateTime<Utc>,
    summary: &'a RunSummary,
    totals: &'a SessionTotals,
}

/// Writes run statistics as pretty-printed JSON
pub struct JsonExporter;

impl JsonExporter {
    /// Export `summary` and `totals` to `path`
    pub fn export_summary(
        summary: &RunSummary,
        totals: &SessionTotals,
        path: &Path,
    ) -> ReportResult<()> {
        let document = SummaryDocument {
            generated_at: Utc::now(),
            summary,
            totals,
        };

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writer.flush()?;

        info!("Summary saved to: {}", path.display());
        Ok(())
    }
}

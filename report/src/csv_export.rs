//! CSV export of per-operation records

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::Writer;
use docbench_core::ProcessingMetrics;
use tracing::info;

use crate::ReportResult;

/// Writes one row per [`ProcessingMetrics`]
pub struct CsvExporter;

impl CsvExporter {
    /// Export `records` to `path`, replacing any existing file
    ///
    /// Columns follow the field order of [`ProcessingMetrics`]. The header
    /// is written even when there are no records.
    pub fn export(records: &[ProcessingMetrics], path: &Path) -> ReportResult<()> {
        Self::write(File::create(path)?, records)?;
        info!(rows = records.len(), "Results saved to: {}", path.display());
        Ok(())
    }

    /// Export `records` to a fresh results file in `dir`
    ///
    /// Returns the path written; see [`create_results_file`].
    pub fn export_new(records: &[ProcessingMetrics], dir: &Path) -> ReportResult<PathBuf> {
        let (file, path) = create_results_file(dir)?;
        Self::write(file, records)?;
        info!(rows = records.len(), "Results saved to: {}", path.display());
        Ok(path)
    }

    fn write(file: File, records: &[ProcessingMetrics]) -> ReportResult<()> {
        let mut wtr = Writer::from_writer(file);

        if records.is_empty() {
            wtr.write_record(COLUMNS)?;
        }
        for record in records {
            wtr.serialize(record)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

const COLUMNS: [&str; 10] = [
    "operation_id",
    "total_time",
    "processing_time",
    "chunking_time",
    "total_chunks",
    "successful_chunks",
    "avg_quality_score",
    "avg_information_density",
    "memory_usage_mb",
    "throughput_per_second",
];

/// Create `<dir>/loadtest_results_<unix-millis>.csv` exclusively
///
/// When the name is taken, `_1`, `_2`, ... are appended until a file can be
/// created, so an existing result is never truncated even by a concurrent
/// run in the same directory.
pub fn create_results_file(dir: &Path) -> io::Result<(File, PathBuf)> {
    let stamp = Utc::now().timestamp_millis();
    let mut suffix = 0u32;
    loop {
        let path = if suffix == 0 {
            dir.join(format!("loadtest_results_{stamp}.csv"))
        } else {
            dir.join(format!("loadtest_results_{stamp}_{suffix}.csv"))
        };

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e),
        }
    }
}

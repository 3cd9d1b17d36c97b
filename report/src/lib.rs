//! Result export and reporting for docbench runs
//!
//! This crate provides:
//!
//! - CSV export of per-operation records
//! - JSON export of aggregate statistics
//! - The console summary printed at the end of a run

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod console;
pub mod csv_export;
pub mod json_export;

pub use console::{ConsoleSummary, RunParameters};
pub use csv_export::{create_results_file, CsvExporter};
pub use json_export::JsonExporter;

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for export operations
pub type ReportResult<T> = Result<T, ReportError>;

//! Server-reported processing results

use serde::{Deserialize, Serialize};

/// Figures a processing client extracts from one successful response
///
/// Durations are in seconds; the client converts from whatever unit the
/// service reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerReport {
    /// Server-side processing time (seconds)
    pub processing_time: f64,
    /// Server-side chunking time (seconds)
    pub chunking_time: f64,
    /// Number of chunks produced
    pub total_chunks: u64,
    /// Number of chunks the service considered successful
    pub successful_chunks: u64,
    /// Mean chunk quality score
    pub avg_quality_score: f64,
    /// Mean chunk information density
    pub avg_information_density: f64,
    /// Size of the submitted payload in bytes
    pub payload_bytes: usize,
}

impl ServerReport {
    /// Payload size in mebibytes
    pub fn payload_mb(&self) -> f64 {
        self.payload_bytes as f64 / (1024.0 * 1024.0)
    }
}

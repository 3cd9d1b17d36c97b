//! Wire types for the `/process` response

use docbench_core::ServerReport;
use serde::Deserialize;

/// Envelope every `/process` response is wrapped in
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessResponse {
    /// Whether the service processed the document
    pub success: bool,
    /// Human-readable status message
    #[serde(default)]
    pub message: Option<String>,
    /// Processing results, present when `success` is true
    #[serde(default)]
    pub data: Option<ProcessData>,
}

/// Processing results
///
/// The service has shipped several names for the same figures; every known
/// name is accepted and the first one present wins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessData {
    #[serde(default)]
    processing_time_ms: Option<f64>,
    #[serde(default)]
    processing_time: Option<f64>,
    #[serde(default)]
    chunking_time_ms: Option<f64>,
    #[serde(default)]
    chunking_time: Option<f64>,
    #[serde(default)]
    total_chunks: Option<u64>,
    #[serde(default)]
    successful_chunks: Option<u64>,
    #[serde(default)]
    avg_quality_score: Option<f64>,
    #[serde(default)]
    avg_chunk_quality: Option<f64>,
    #[serde(default)]
    content_quality_score: Option<f64>,
    #[serde(default)]
    avg_information_density: Option<f64>,
    #[serde(default)]
    avg_chunk_density: Option<f64>,
    #[serde(default)]
    information_density: Option<f64>,
}

impl ProcessData {
    /// Server processing time in seconds
    pub fn processing_secs(&self) -> f64 {
        self.processing_time_ms
            .map(|ms| ms / 1000.0)
            .or(self.processing_time)
            .unwrap_or(0.0)
    }

    /// Server chunking time in seconds
    pub fn chunking_secs(&self) -> f64 {
        self.chunking_time_ms
            .map(|ms| ms / 1000.0)
            .or(self.chunking_time)
            .unwrap_or(0.0)
    }

    /// Mean chunk quality score
    pub fn quality_score(&self) -> f64 {
        self.avg_quality_score
            .or(self.avg_chunk_quality)
            .or(self.content_quality_score)
            .unwrap_or(0.0)
    }

    /// Mean chunk information density
    pub fn information_density(&self) -> f64 {
        self.avg_information_density
            .or(self.avg_chunk_density)
            .or(self.information_density)
            .unwrap_or(0.0)
    }

    /// Convert into the engine's report for a payload of `payload_bytes`
    pub fn into_report(self, payload_bytes: usize) -> ServerReport {
        ServerReport {
            processing_time: self.processing_secs(),
            chunking_time: self.chunking_secs(),
            total_chunks: self.total_chunks.unwrap_or(0),
            successful_chunks: self.successful_chunks.unwrap_or(0),
            avg_quality_score: self.quality_score(),
            avg_information_density: self.information_density(),
            payload_bytes,
        }
    }
}

//! Per-operation metrics, run collection and statistical aggregation

use crate::error::{BenchError, BenchResult};
use crate::response::ServerReport;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

/// Metrics recorded for one successfully completed processing request
///
/// Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingMetrics {
    /// Unique identifier within the run
    pub operation_id: String,
    /// Wall-clock round trip, seconds
    pub total_time: f64,
    /// Server-reported processing time, seconds
    pub processing_time: f64,
    /// Server-reported chunking time, seconds
    pub chunking_time: f64,
    /// Server-reported chunk count
    pub total_chunks: u64,
    /// Server-reported successful chunk count
    pub successful_chunks: u64,
    /// Server-reported mean quality score
    pub avg_quality_score: f64,
    /// Server-reported mean information density
    pub avg_information_density: f64,
    /// Payload size in MiB
    pub memory_usage_mb: f64,
    /// `1 / total_time`, or 0 when `total_time` is 0
    pub throughput_per_second: f64,
}

impl ProcessingMetrics {
    /// Build a record from the measured round trip and the server's report
    pub fn from_report(
        operation_id: impl Into<String>,
        total_time: Duration,
        report: &ServerReport,
    ) -> Self {
        let total_time = total_time.as_secs_f64();
        Self {
            operation_id: operation_id.into(),
            total_time,
            processing_time: report.processing_time,
            chunking_time: report.chunking_time,
            total_chunks: report.total_chunks,
            successful_chunks: report.successful_chunks,
            avg_quality_score: report.avg_quality_score,
            avg_information_density: report.avg_information_density,
            memory_usage_mb: report.payload_mb(),
            throughput_per_second: throughput(total_time),
        }
    }
}

/// Operations per second for a single round trip of `total_time` seconds
pub fn throughput(total_time: f64) -> f64 {
    if total_time > 0.0 {
        1.0 / total_time
    } else {
        0.0
    }
}

/// Sending half of the run's metrics store
pub type MetricsSender = mpsc::Sender<ProcessingMetrics>;

/// All metrics gathered during one run
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    records: Vec<ProcessingMetrics>,
}

impl RunResult {
    /// Read-only view of the records
    pub fn records(&self) -> &[ProcessingMetrics] {
        &self.records
    }

    /// Number of recorded operations
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<ProcessingMetrics>> for RunResult {
    fn from(records: Vec<ProcessingMetrics>) -> Self {
        Self { records }
    }
}

/// Drain the metrics channel into a [`RunResult`]
///
/// This is the only writer of the run's records. It returns once every
/// sender has been dropped.
pub async fn collect(mut rx: mpsc::Receiver<ProcessingMetrics>) -> RunResult {
    let mut records = Vec::new();
    while let Some(record) = rx.recv().await {
        records.push(record);
    }
    tracing::debug!(records = records.len(), "Metrics collector finished");
    RunResult { records }
}

/// Descriptive statistics for one measured field
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Minimum
    pub min: f64,
    /// Maximum
    pub max: f64,
    /// Median (50th percentile, interpolated)
    pub median: f64,
}

impl FieldStats {
    /// Statistics over `values`, or `None` if empty
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let sorted = sorted(values);
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        Some(Self {
            mean,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            median: percentile(&sorted, 0.50),
        })
    }
}

/// Aggregate statistics over a run's records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of recorded operations
    pub total_operations: usize,
    /// Measured wall-clock run duration, seconds
    pub run_duration_secs: f64,
    /// Round-trip time, seconds
    pub total_time: FieldStats,
    /// 95th percentile of round-trip time, seconds
    pub total_time_p95: f64,
    /// Server processing time, seconds
    pub processing_time: FieldStats,
    /// Server chunking time, seconds
    pub chunking_time: FieldStats,
    /// Per-operation throughput
    pub throughput: FieldStats,
    /// Chunks per document
    pub total_chunks: FieldStats,
    /// Successful chunks per document
    pub successful_chunks: FieldStats,
    /// Quality score
    pub avg_quality_score: FieldStats,
    /// Information density
    pub avg_information_density: FieldStats,
    /// Fraction of operations with at least one successful chunk
    pub success_rate: f64,
}

impl RunSummary {
    /// Summarize `records`
    ///
    /// # Errors
    /// Returns a `NoDataCollected` error when `records` is empty.
    pub fn from_records(records: &[ProcessingMetrics], run_duration: Duration) -> BenchResult<Self> {
        if records.is_empty() {
            return Err(BenchError::no_data());
        }

        let field = |f: fn(&ProcessingMetrics) -> f64| -> BenchResult<FieldStats> {
            let values: Vec<f64> = records.iter().map(f).collect();
            FieldStats::from_values(&values).ok_or_else(BenchError::no_data)
        };

        let total_times: Vec<f64> = records.iter().map(|r| r.total_time).collect();
        let successful = records.iter().filter(|r| r.successful_chunks > 0).count();

        Ok(Self {
            total_operations: records.len(),
            run_duration_secs: run_duration.as_secs_f64(),
            total_time: field(|r| r.total_time)?,
            total_time_p95: percentile(&sorted(&total_times), 0.95),
            processing_time: field(|r| r.processing_time)?,
            chunking_time: field(|r| r.chunking_time)?,
            throughput: field(|r| r.throughput_per_second)?,
            total_chunks: field(|r| r.total_chunks as f64)?,
            successful_chunks: field(|r| r.successful_chunks as f64)?,
            avg_quality_score: field(|r| r.avg_quality_score)?,
            avg_information_density: field(|r| r.avg_information_density)?,
            success_rate: successful as f64 / records.len() as f64,
        })
    }

    /// Recorded operations per second of wall-clock run time
    pub fn operations_per_second(&self) -> f64 {
        if self.run_duration_secs > 0.0 {
            self.total_operations as f64 / self.run_duration_secs
        } else {
            0.0
        }
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Calculate percentile from sorted values using linear interpolation
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let idx = p * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: usize, total_time: f64, successful_chunks: u64) -> ProcessingMetrics {
        ProcessingMetrics {
            operation_id: format!("op_{id}"),
            total_time,
            processing_time: total_time / 2.0,
            chunking_time: 0.0,
            total_chunks: 10,
            successful_chunks,
            avg_quality_score: 0.8,
            avg_information_density: 0.4,
            memory_usage_mb: 0.01,
            throughput_per_second: throughput(total_time),
        }
    }

    #[test]
    fn test_throughput_zero_time() {
        assert_eq!(throughput(0.0), 0.0);
        assert_eq!(throughput(0.5), 2.0);
        assert_eq!(throughput(-1.0), 0.0);
    }

    #[test]
    fn test_from_report() {
        let report = ServerReport {
            processing_time: 0.25,
            chunking_time: 0.05,
            total_chunks: 12,
            successful_chunks: 11,
            avg_quality_score: 0.9,
            avg_information_density: 0.3,
            payload_bytes: 1024 * 1024,
        };
        let m = ProcessingMetrics::from_report("op_1_0", Duration::from_millis(500), &report);

        assert_eq!(m.operation_id, "op_1_0");
        assert_eq!(m.total_time, 0.5);
        assert_eq!(m.throughput_per_second, 2.0);
        assert_eq!(m.memory_usage_mb, 1.0);
        assert_eq!(m.total_chunks, 12);
        assert_eq!(m.successful_chunks, 11);
    }

    #[test]
    fn test_from_report_instantaneous() {
        let m = ProcessingMetrics::from_report("op", Duration::ZERO, &ServerReport::default());
        assert_eq!(m.throughput_per_second, 0.0);
    }

    #[test]
    fn test_field_stats() {
        let stats = FieldStats::from_values(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert!((stats.mean - 2.5).abs() < 1e-12);
        assert!((stats.median - 2.5).abs() < 1e-12);

        assert!(FieldStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_percentile_calculation() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        assert!((percentile(&values, 0.50) - 5.5).abs() < 0.01);
        assert!((percentile(&values, 0.95) - 9.55).abs() < 0.01);
        assert_eq!(percentile(&[42.0], 0.95), 42.0);
        assert_eq!(percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn test_summary_empty_is_no_data() {
        let err = RunSummary::from_records(&[], Duration::from_secs(1)).unwrap_err();
        assert!(err.is_no_data());
    }

    #[test]
    fn test_summary_bounds_and_success_rate() {
        let records = vec![
            record(0, 0.2, 5),
            record(1, 0.4, 0),
            record(2, 0.6, 3),
            record(3, 0.0, 1),
        ];
        let summary = RunSummary::from_records(&records, Duration::from_secs(2)).unwrap();

        assert_eq!(summary.total_operations, 4);
        assert!((summary.success_rate - 0.75).abs() < 1e-12);
        assert!((summary.operations_per_second() - 2.0).abs() < 1e-12);

        for stats in [
            summary.total_time,
            summary.processing_time,
            summary.chunking_time,
            summary.throughput,
            summary.total_chunks,
            summary.successful_chunks,
            summary.avg_quality_score,
            summary.avg_information_density,
        ] {
            assert!(stats.min <= stats.mean && stats.mean <= stats.max);
            assert!(stats.min <= stats.median && stats.median <= stats.max);
        }
        assert_eq!(summary.total_time.max, 0.6);
        assert_eq!(summary.throughput.min, 0.0);
        assert!(summary.total_time_p95 <= summary.total_time.max);
        assert!(summary.total_time.mean.is_finite());
    }

    #[tokio::test]
    async fn test_collect_from_many_senders() {
        let (tx, rx) = mpsc::channel(4);
        let collector = tokio::spawn(collect(rx));

        let mut handles = Vec::new();
        for sender in 0..8 {
            let tx = tx.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    tx.send(record(sender * 100 + i, 0.1, 1)).await.unwrap();
                }
            }));
        }
        drop(tx);
        for handle in handles {
            handle.await.unwrap();
        }

        let result = collector.await.unwrap();
        assert_eq!(result.len(), 200);
        let mut ids: Vec<&str> = result.records().iter().map(|r| r.operation_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }
}

//! Tests for the LoadController module

use super::aggregator::{aggregate_session_stats, SessionTotals};
use super::builder::LoadControllerBuilder;
use crate::config::LoadTestConfig;
use crate::document::TestDocument;
use crate::response::ServerReport;
use crate::session::SessionStats;
use crate::traits::{ClientError, CorpusBuilder, DurationPolicy, GenerationError, ProcessingClient};

use async_trait::async_trait;
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Mock ProcessingClient
// ============================================================================

struct MockClient {
    delay: Option<Duration>,
    status: Option<u16>,
    healthy: bool,
    calls: AtomicUsize,
}

impl MockClient {
    fn new() -> Self {
        Self {
            delay: None,
            status: None,
            healthy: true,
            calls: AtomicUsize::new(0),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn always_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }
}

#[async_trait]
impl ProcessingClient for MockClient {
    fn base_url(&self) -> &str {
        "http://mock"
    }

    async fn process(&self, document: &TestDocument) -> Result<ServerReport, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(status) = self.status {
            return Err(ClientError::Status {
                status,
                body: "Internal Server Error".into(),
            });
        }

        Ok(ServerReport {
            processing_time: 0.002,
            chunking_time: 0.001,
            total_chunks: 6,
            successful_chunks: 5,
            avg_quality_score: 0.75,
            avg_information_density: 0.45,
            payload_bytes: document.len(),
        })
    }

    async fn health_check(&self) -> Result<(), ClientError> {
        if self.healthy {
            Ok(())
        } else {
            Err(ClientError::Status {
                status: 503,
                body: "unavailable".into(),
            })
        }
    }
}

// ============================================================================
// Mock CorpusBuilder
// ============================================================================

struct MockCorpus {
    sizes: Vec<u32>,
    fail_for_session: Option<usize>,
}

impl MockCorpus {
    fn new(sizes: &[u32]) -> Self {
        Self {
            sizes: sizes.to_vec(),
            fail_for_session: None,
        }
    }

    fn failing_for(mut self, session_id: usize) -> Self {
        self.fail_for_session = Some(session_id);
        self
    }
}

#[async_trait]
impl CorpusBuilder for MockCorpus {
    fn name(&self) -> &str {
        "mock"
    }

    fn size_classes(&self) -> &[u32] {
        &self.sizes
    }

    async fn build(&self, session_id: usize) -> Result<Vec<TestDocument>, GenerationError> {
        if self.fail_for_session == Some(session_id) {
            return Err(GenerationError::InvalidConfig("staging unavailable".into()));
        }
        Ok(self
            .sizes
            .iter()
            .map(|&kb| {
                TestDocument::new(
                    kb,
                    "w".repeat(kb as usize * 1024),
                    format!("staging/doc_s{session_id}_{kb}kb.txt"),
                )
            })
            .collect())
    }
}

fn config(sessions: usize, batches: usize, repeat: usize) -> LoadTestConfig {
    LoadTestConfig::new(sessions)
        .with_batches_per_session(batches)
        .with_corpus_repeat(repeat)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_session_totals_default() {
    let totals = SessionTotals::default();
    assert_eq!(totals.sessions, 0);
    assert_eq!(totals.success_rate(), 0.0);
}

#[test]
fn test_aggregate_session_stats() {
    let mut s1 = SessionStats::new(0);
    s1.succeeded = 18;
    s1.failed = 2;
    let mut s2 = SessionStats::new(1);
    s2.succeeded = 12;
    s2.cancelled = 8;
    s2.batches_failed = 1;

    let totals = aggregate_session_stats(&[s1, s2], 1, Duration::from_secs(10));

    assert_eq!(totals.sessions, 2);
    assert_eq!(totals.failed_sessions, 1);
    assert_eq!(totals.attempted, 40);
    assert_eq!(totals.succeeded, 30);
    assert_eq!(totals.failed, 2);
    assert_eq!(totals.cancelled, 8);
    assert_eq!(totals.batches_failed, 1);
    assert!((totals.requests_per_second - 3.0).abs() < 1e-12);
    assert!((totals.success_rate() - 30.0 / 32.0).abs() < 1e-12);
}

#[test]
fn test_aggregate_session_stats_zero_duration() {
    let totals = aggregate_session_stats(&[SessionStats::new(0)], 0, Duration::ZERO);
    assert_eq!(totals.requests_per_second, 0.0);
}

#[test]
fn test_builder_missing_client() {
    let result = LoadControllerBuilder::new()
        .corpus(Arc::new(MockCorpus::new(&[1])))
        .build();

    assert!(result.unwrap_err().message.contains("client"));
}

#[test]
fn test_builder_missing_corpus() {
    let result = LoadControllerBuilder::new()
        .client(Arc::new(MockClient::new()))
        .build();

    assert!(result.unwrap_err().message.contains("corpus"));
}

#[test]
fn test_builder_invalid_config() {
    let result = LoadControllerBuilder::new()
        .client(Arc::new(MockClient::new()))
        .corpus(Arc::new(MockCorpus::new(&[1])))
        .concurrency(0)
        .build();

    assert!(result.unwrap_err().is_fatal_setup());
}

#[test]
fn test_builder_empty_corpus() {
    let result = LoadControllerBuilder::new()
        .client(Arc::new(MockClient::new()))
        .corpus(Arc::new(MockCorpus::new(&[])))
        .build();

    assert!(result.is_err());
}

#[test]
fn test_planned_requests() {
    let controller = LoadControllerBuilder::new()
        .config(config(3, 4, 2))
        .client(Arc::new(MockClient::new()))
        .corpus(Arc::new(MockCorpus::new(&[1, 5, 10, 25, 50])))
        .build()
        .unwrap();

    assert_eq!(controller.planned_requests(), 3 * 4 * 5 * 2);
}

// ============================================================================
// Integration Tests
// ============================================================================

#[tokio::test]
async fn test_single_session_single_batch() {
    let client = Arc::new(MockClient::new());
    let controller = LoadControllerBuilder::new()
        .config(config(1, 1, 2))
        .client(client.clone())
        .corpus(Arc::new(MockCorpus::new(&[1])))
        .build()
        .unwrap();

    let report = controller.run().await.unwrap();

    assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    assert_eq!(report.records().len(), 2);
    assert!(!report.interrupted);

    let summary = report.summary().unwrap();
    assert_eq!(summary.total_operations, 2);
    assert_eq!(summary.success_rate, 1.0);
}

#[tokio::test]
async fn test_all_requests_fail_reports_no_data() {
    let client = Arc::new(MockClient::new().always_status(500));
    let controller = LoadControllerBuilder::new()
        .config(config(2, 2, 2))
        .client(client.clone())
        .corpus(Arc::new(MockCorpus::new(&[1, 5])))
        .build()
        .unwrap();

    let report = controller.run().await.unwrap();

    assert!(report.records().is_empty());
    assert!(report.summary().unwrap_err().is_no_data());

    let totals = report.totals();
    assert_eq!(totals.failed, 16);
    assert_eq!(totals.succeeded, 0);
    assert_eq!(client.calls.load(Ordering::SeqCst), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions_collect_every_record() {
    let controller = LoadControllerBuilder::new()
        .config(config(4, 3, 2).with_max_in_flight(8))
        .client(Arc::new(MockClient::new().with_delay(Duration::from_millis(2))))
        .corpus(Arc::new(MockCorpus::new(&[1, 5, 10])))
        .build()
        .unwrap();

    let report = controller.run().await.unwrap();

    assert_eq!(report.records().len(), 4 * 3 * 3 * 2);
    assert_eq!(report.totals().succeeded, report.records().len());

    let ids: HashSet<&str> = report
        .records()
        .iter()
        .map(|r| r.operation_id.as_str())
        .collect();
    assert_eq!(ids.len(), report.records().len());
}

#[tokio::test]
async fn test_failed_session_does_not_affect_others() {
    let controller = LoadControllerBuilder::new()
        .config(config(3, 1, 2))
        .client(Arc::new(MockClient::new()))
        .corpus(Arc::new(MockCorpus::new(&[1, 5]).failing_for(1)))
        .build()
        .unwrap();

    let report = controller.run().await.unwrap();

    assert_eq!(report.failed_sessions, 1);
    assert_eq!(report.sessions.len(), 2);
    assert_eq!(report.records().len(), 8);
}

#[tokio::test]
async fn test_shutdown_returns_partial_report() {
    let controller = Arc::new(
        LoadControllerBuilder::new()
            .config(config(2, 50, 2))
            .client(Arc::new(MockClient::new().with_delay(Duration::from_millis(20))))
            .corpus(Arc::new(MockCorpus::new(&[1])))
            .build()
            .unwrap(),
    );

    let trigger = Arc::clone(&controller);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.shutdown();
    });

    let report = tokio::time::timeout(Duration::from_secs(10), controller.run())
        .await
        .expect("run did not stop after shutdown")
        .unwrap();

    assert!(report.interrupted);
    let totals = report.totals();
    assert!(totals.succeeded < 2 * 50 * 2);
    assert_eq!(totals.succeeded, report.records().len());
}

#[tokio::test]
async fn test_enforced_duration_stops_run() {
    let controller = LoadControllerBuilder::new()
        .config(config(1, 5, 1))
        .duration(Duration::from_millis(100), DurationPolicy::Enforced)
        .client(Arc::new(MockClient::new().with_delay(Duration::from_secs(30))))
        .corpus(Arc::new(MockCorpus::new(&[1])))
        .build()
        .unwrap();

    let report = tokio::time::timeout(Duration::from_secs(10), controller.run())
        .await
        .expect("enforced duration did not stop the run")
        .unwrap();

    assert!(report.interrupted);
    assert!(report.records().is_empty());
    assert_eq!(report.totals().cancelled, 1);
}

#[tokio::test]
async fn test_advisory_duration_runs_to_completion() {
    let controller = LoadControllerBuilder::new()
        .config(config(1, 3, 1))
        .duration(Duration::from_millis(1), DurationPolicy::Advisory)
        .client(Arc::new(MockClient::new().with_delay(Duration::from_millis(10))))
        .corpus(Arc::new(MockCorpus::new(&[1])))
        .build()
        .unwrap();

    let report = controller.run().await.unwrap();

    assert!(!report.interrupted);
    assert_eq!(report.records().len(), 3);
}

#[tokio::test]
async fn test_preflight() {
    let healthy = LoadControllerBuilder::new()
        .client(Arc::new(MockClient::new()))
        .corpus(Arc::new(MockCorpus::new(&[1])))
        .build()
        .unwrap();
    assert!(healthy.preflight().await.is_ok());

    let unhealthy = LoadControllerBuilder::new()
        .client(Arc::new(MockClient::new().unhealthy()))
        .corpus(Arc::new(MockCorpus::new(&[1])))
        .build()
        .unwrap();
    let err = unhealthy.preflight().await.unwrap_err();
    assert!(err.is_fatal_setup());
    assert!(err.message.contains("http://mock"));
}

#[tokio::test]
async fn test_progress_ticks_per_request() {
    let bar = ProgressBar::hidden();
    let controller = LoadControllerBuilder::new()
        .config(config(2, 2, 2))
        .client(Arc::new(MockClient::new()))
        .corpus(Arc::new(MockCorpus::new(&[1, 5])))
        .progress(bar.clone())
        .build()
        .unwrap();

    controller.run().await.unwrap();

    assert_eq!(bar.length(), Some(16));
    assert_eq!(bar.position(), 16);
}

#[tokio::test]
async fn test_controller_runs_again_after_shutdown() {
    let client = Arc::new(MockClient::new());
    let controller = LoadControllerBuilder::new()
        .config(config(2, 2, 1))
        .client(client.clone())
        .corpus(Arc::new(MockCorpus::new(&[1, 5])))
        .build()
        .unwrap();

    controller.shutdown();
    let first = controller.run().await.unwrap();
    assert!(first.interrupted);
    assert!(first.records().is_empty());
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    assert!(!*controller.shutdown_receiver().borrow());

    let second = controller.run().await.unwrap();
    assert!(!second.interrupted);
    assert_eq!(second.records().len(), 2 * 2 * 2);
    assert_eq!(second.totals().cancelled, 0);
}

#[tokio::test]
async fn test_enforced_duration_longer_than_work_is_not_interrupted() {
    let controller = LoadControllerBuilder::new()
        .config(config(1, 2, 1))
        .duration(Duration::from_millis(200), DurationPolicy::Enforced)
        .client(Arc::new(MockClient::new()))
        .corpus(Arc::new(MockCorpus::new(&[1])))
        .build()
        .unwrap();

    let report = controller.run().await.unwrap();
    assert!(!report.interrupted);
    assert_eq!(report.records().len(), 2);

    // The deadline task is gone; a later deadline cannot mark the next run
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!*controller.shutdown_receiver().borrow());
}

#[tokio::test]
async fn test_run_until_signal_stops_run() {
    let client = Arc::new(MockClient::new().with_delay(Duration::from_secs(30)));
    let controller = LoadControllerBuilder::new()
        .config(config(2, 5, 1))
        .client(client.clone())
        .corpus(Arc::new(MockCorpus::new(&[1])))
        .build()
        .unwrap();

    let signal = tokio::time::sleep(Duration::from_millis(50));
    let report = tokio::time::timeout(Duration::from_secs(10), controller.run_until(signal))
        .await
        .expect("signal did not stop the run")
        .unwrap();

    assert!(report.interrupted);
    assert!(report.records().is_empty());
    let totals = report.totals();
    assert_eq!(totals.cancelled, 2);
    assert_eq!(totals.succeeded + totals.failed, 0);
    assert_eq!(client.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_run_until_without_signal_completes() {
    let (_signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
    let controller = LoadControllerBuilder::new()
        .config(config(1, 2, 2))
        .client(Arc::new(MockClient::new()))
        .corpus(Arc::new(MockCorpus::new(&[1, 5])))
        .build()
        .unwrap();

    let report = controller
        .run_until(async {
            let _ = signal_rx.await;
        })
        .await
        .unwrap();

    assert!(!report.interrupted);
    assert_eq!(report.records().len(), 8);
}

//! LoadController execution logic

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use indicatif::ProgressBar;
use tokio::sync::{watch, Semaphore};
use tracing::Instrument;

use crate::channel::ChannelConfig;
use crate::config::LoadTestConfig;
use crate::error::{BenchError, BenchResult};
use crate::metrics::collect;
use crate::request::RequestExecutor;
use crate::session::{BatchRunner, RequestRateLimiter, SessionBuilder, SessionStats};
use crate::traits::{CorpusBuilder, DurationPolicy, ProcessingClient};

use super::aggregator::{aggregate_session_stats, RunReport};

/// LoadController manages the run lifecycle
///
/// Launches every session concurrently, owns the metrics collector, and
/// coordinates shutdown. It writes no console output; progress goes to the
/// optional progress bar and everything else to `tracing`.
pub struct LoadController {
    config: LoadTestConfig,
    client: Arc<dyn ProcessingClient>,
    corpus: Arc<dyn CorpusBuilder>,
    channel_config: ChannelConfig,
    progress: Option<ProgressBar>,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl LoadController {
    /// Create a new controller
    ///
    /// Use `LoadControllerBuilder` for validated construction.
    pub fn new(
        config: LoadTestConfig,
        client: Arc<dyn ProcessingClient>,
        corpus: Arc<dyn CorpusBuilder>,
        channel_config: ChannelConfig,
        progress: Option<ProgressBar>,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            client,
            corpus,
            channel_config,
            progress,
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// The load test configuration
    pub fn config(&self) -> &LoadTestConfig {
        &self.config
    }

    /// Requests the run issues if nothing is cancelled
    pub fn planned_requests(&self) -> usize {
        self.config.total_requests(self.corpus.size_classes().len())
    }

    /// Get a shutdown signal receiver
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Signal every session to stop
    ///
    /// Sessions stop between batches; requests not yet issued are skipped
    /// and in-flight ones abandoned.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Check that the target service is reachable
    ///
    /// # Errors
    /// A fatal setup error if the health check fails.
    pub async fn preflight(&self) -> BenchResult<()> {
        self.client.health_check().await.map_err(|e| {
            BenchError::setup(format!(
                "health check against {} failed: {e}",
                self.client.base_url()
            ))
        })?;
        tracing::info!(url = self.client.base_url(), "Service is healthy");
        Ok(())
    }

    /// Run all sessions to completion
    ///
    /// Returns once every session has finished and the collector has
    /// drained, so the report is complete. The report is `interrupted` only
    /// if shutdown made a session skip a batch or cancel a request. The
    /// shutdown flag is cleared on return, so the controller can run again.
    pub async fn run(&self) -> BenchResult<RunReport> {
        let start = Instant::now();

        let (metrics_tx, metrics_rx) = self.channel_config.metrics_channel();
        let collector = tokio::spawn(collect(metrics_rx));

        let runner = BatchRunner::new(
            RequestExecutor::new(Arc::clone(&self.client)),
            metrics_tx,
            Arc::new(Semaphore::new(self.config.max_in_flight)),
            Arc::new(RequestRateLimiter::new(self.config.rate_limit)),
        )
        .with_progress(self.progress.clone());

        if let Some(ref progress) = self.progress {
            progress.set_length(self.planned_requests() as u64);
        }

        let deadline = match self.config.duration_policy {
            DurationPolicy::Enforced => {
                let shutdown_tx = Arc::clone(&self.shutdown_tx);
                let duration = self.config.duration;
                Some(tokio::spawn(async move {
                    tokio::time::sleep(duration).await;
                    tracing::info!(?duration, "Test duration reached, initiating shutdown");
                    shutdown_tx.send_replace(true);
                }))
            }
            DurationPolicy::Advisory => {
                tracing::info!(
                    duration = ?self.config.duration,
                    "Duration is advisory; sessions run every batch"
                );
                None
            }
        };

        tracing::info!(
            url = self.client.base_url(),
            sessions = self.config.num_concurrent,
            batches_per_session = self.config.batches_per_session,
            corpus_repeat = self.config.corpus_repeat,
            max_in_flight = self.config.max_in_flight,
            rate_limit = ?self.config.rate_limit,
            planned_requests = self.planned_requests(),
            "Starting load test"
        );

        let mut handles = Vec::with_capacity(self.config.num_concurrent);
        for session_id in 0..self.config.num_concurrent {
            let session = SessionBuilder::new(session_id)
                .corpus(Arc::clone(&self.corpus))
                .runner(runner.clone())
                .batches(self.config.batches_per_session)
                .corpus_repeat(self.config.corpus_repeat)
                .build()?;
            let shutdown_rx = self.shutdown_tx.subscribe();
            let span = tracing::info_span!("session", id = session_id);

            handles.push(tokio::spawn(session.run(shutdown_rx).instrument(span)));
        }

        // The collector finishes once the last session drops its runner.
        drop(runner);

        let mut sessions = Vec::with_capacity(handles.len());
        let mut failed_sessions = 0;
        for (session_id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Ok(stats)) => sessions.push(stats),
                Ok(Err(e)) => {
                    failed_sessions += 1;
                    tracing::error!(session_id, error = %e, "Session returned error");
                }
                Err(e) => {
                    failed_sessions += 1;
                    tracing::error!(session_id, error = %e, "Session task panicked");
                }
            }
        }

        if let Some(deadline) = deadline {
            deadline.abort();
        }
        let interrupted = sessions.iter().any(SessionStats::interrupted);
        self.shutdown_tx.send_replace(false);

        let result = collector
            .await
            .map_err(|e| BenchError::internal(format!("metrics collector failed: {e}")))?;

        let duration = start.elapsed();

        if let Some(ref progress) = self.progress {
            progress.finish_and_clear();
        }

        let totals = aggregate_session_stats(&sessions, failed_sessions, duration);
        tracing::info!(
            elapsed_secs = duration.as_secs_f64(),
            records = result.len(),
            succeeded = totals.succeeded,
            failed = totals.failed,
            cancelled = totals.cancelled,
            failed_sessions,
            interrupted,
            "Load test completed"
        );

        Ok(RunReport {
            result,
            sessions,
            failed_sessions,
            duration,
            interrupted,
        })
    }

    /// Run until done, shutting down early if `signal` resolves first
    ///
    /// `signal` triggers the same shutdown as [`LoadController::shutdown`];
    /// the partial report is still returned.
    pub async fn run_until<F>(&self, signal: F) -> BenchResult<RunReport>
    where
        F: Future<Output = ()>,
    {
        let run = self.run();
        tokio::pin!(run);

        tokio::select! {
            report = &mut run => return report,
            () = signal => {
                tracing::warn!("Shutdown requested, abandoning in-flight work");
                self.shutdown();
            }
        }

        run.await
    }

    /// Run with Ctrl+C signal handling
    ///
    /// See [`LoadController::run_until`].
    pub async fn run_with_signal_handling(&self) -> BenchResult<RunReport> {
        self.run_until(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::warn!("Received Ctrl+C"),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
    }
}

impl std::fmt::Debug for LoadController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadController")
            .field("config", &self.config)
            .field("client", &self.client.base_url())
            .field("corpus", &self.corpus.name())
            .finish()
    }
}

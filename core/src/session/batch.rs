//! Concurrent fan-out of one batch of documents

use crate::document::TestDocument;
use crate::error::BenchError;
use crate::metrics::MetricsSender;
use crate::request::RequestExecutor;

use super::rate_limiter::RequestRateLimiter;
use super::stats::BatchOutcome;
use super::wait_for_shutdown;

use indicatif::ProgressBar;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::Instrument;

/// How a single request task ended
enum RequestEnd {
    Succeeded,
    Failed,
    Cancelled,
    StoreClosed,
}

/// A batch that ended with a batch-level error
///
/// `outcome` still holds every request the batch finished, so callers can
/// account for them.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct BatchFailure {
    /// Requests finished before and after the error
    pub outcome: BatchOutcome,
    /// What went wrong
    #[source]
    pub error: BenchError,
}

/// Issues every document of a batch concurrently and tallies the outcomes
///
/// Each document runs in its own task, so a failing or panicking request
/// never affects its siblings. The in-flight semaphore and the rate limiter
/// are shared run-wide; clones of a runner share them too.
#[derive(Clone)]
pub struct BatchRunner {
    executor: RequestExecutor,
    metrics_tx: MetricsSender,
    semaphore: Arc<Semaphore>,
    rate_limiter: Arc<RequestRateLimiter>,
    progress: Option<ProgressBar>,
}

impl BatchRunner {
    /// Create a runner
    pub fn new(
        executor: RequestExecutor,
        metrics_tx: MetricsSender,
        semaphore: Arc<Semaphore>,
        rate_limiter: Arc<RequestRateLimiter>,
    ) -> Self {
        Self {
            executor,
            metrics_tx,
            semaphore,
            rate_limiter,
            progress: None,
        }
    }

    /// Tick `progress` once per finished request
    pub fn with_progress(mut self, progress: Option<ProgressBar>) -> Self {
        self.progress = progress;
        self
    }

    /// Run one batch to completion
    ///
    /// Per-request failures are logged and counted; they never fail the
    /// batch. The batch itself fails only when the metrics store is gone,
    /// and the failure carries the partial outcome.
    pub async fn run(
        &self,
        documents: &[TestDocument],
        shutdown: &watch::Receiver<bool>,
    ) -> Result<BatchOutcome, BatchFailure> {
        let mut tasks = JoinSet::new();

        for document in documents {
            let span = tracing::debug_span!(
                "request",
                document = %document.file_name(),
                size_kb = document.size_kb()
            );
            tasks.spawn(
                self.clone()
                    .issue(document.clone(), shutdown.clone())
                    .instrument(span),
            );
        }

        let mut outcome = BatchOutcome::default();
        let mut store_closed = false;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(RequestEnd::Succeeded) => outcome.succeeded += 1,
                Ok(RequestEnd::Failed) => outcome.failed += 1,
                Ok(RequestEnd::Cancelled) => outcome.cancelled += 1,
                Ok(RequestEnd::StoreClosed) => {
                    outcome.failed += 1;
                    store_closed = true;
                }
                Err(e) if e.is_panic() => {
                    outcome.failed += 1;
                    tracing::error!(error = %e, "Request task panicked");
                }
                Err(_) => outcome.cancelled += 1,
            }
            if let Some(ref progress) = self.progress {
                progress.inc(1);
            }
        }

        if store_closed {
            return Err(BatchFailure {
                outcome,
                error: BenchError::internal("metrics store closed before the batch finished"),
            });
        }

        Ok(outcome)
    }

    async fn issue(self, document: TestDocument, mut shutdown: watch::Receiver<bool>) -> RequestEnd {
        if *shutdown.borrow() {
            return RequestEnd::Cancelled;
        }

        let outcome = tokio::select! {
            biased;

            _ = wait_for_shutdown(&mut shutdown) => {
                tracing::debug!("Request abandoned on shutdown");
                return RequestEnd::Cancelled;
            }

            outcome = async {
                self.rate_limiter.wait().await;
                let _permit = self.semaphore.acquire().await.ok()?;
                Some(self.executor.execute(&document).await)
            } => outcome,
        };

        match outcome {
            None => RequestEnd::Cancelled,
            Some(Ok(metrics)) => {
                tracing::debug!(
                    operation_id = %metrics.operation_id,
                    total_time = metrics.total_time,
                    "Request completed"
                );
                if self.metrics_tx.send(metrics).await.is_err() {
                    tracing::warn!("Metrics channel closed, result dropped");
                    return RequestEnd::StoreClosed;
                }
                RequestEnd::Succeeded
            }
            Some(Err(failed)) => {
                tracing::warn!(
                    document = %failed.path.display(),
                    size_kb = failed.size_kb,
                    kind = %failed.kind,
                    error = %failed.cause,
                    "Request failed"
                );
                RequestEnd::Failed
            }
        }
    }
}

impl std::fmt::Debug for BatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRunner")
            .field("executor", &self.executor)
            .field("available_permits", &self.semaphore.available_permits())
            .field("rate_limiter", &self.rate_limiter)
            .finish()
    }
}

//! Session execution loop

use crate::document::build_batches;
use crate::error::{BenchError, BenchResult};
use crate::traits::CorpusBuilder;

use super::batch::BatchRunner;
use super::stats::SessionStats;

use std::sync::Arc;
use tokio::sync::watch;

/// One simulated client: build the corpus once, then run batches in order
///
/// Batches never overlap within a session, which caps a session's
/// in-flight requests at one batch width.
pub struct Session {
    id: usize,
    corpus: Arc<dyn CorpusBuilder>,
    runner: BatchRunner,
    batches: usize,
    corpus_repeat: usize,
}

impl Session {
    /// Create a session
    ///
    /// Use `SessionBuilder` for validated construction.
    pub fn new(
        id: usize,
        corpus: Arc<dyn CorpusBuilder>,
        runner: BatchRunner,
        batches: usize,
        corpus_repeat: usize,
    ) -> Self {
        Self {
            id,
            corpus,
            runner,
            batches,
            corpus_repeat,
        }
    }

    /// Run the session until all batches finish or shutdown is signalled
    ///
    /// Batch-level failures are logged and the loop moves on. Only a corpus
    /// that cannot be built ends the session with an error.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> BenchResult<SessionStats> {
        let mut stats = SessionStats::new(self.id);
        stats.start();

        let corpus = self.corpus.build(self.id).await.map_err(|e| {
            BenchError::session(self.id, format!("corpus generation failed: {e}"))
        })?;
        tracing::info!(
            documents = corpus.len(),
            builder = self.corpus.name(),
            "Corpus ready"
        );

        let batches = build_batches(&corpus, self.batches, self.corpus_repeat);

        for (index, batch) in batches.iter().enumerate() {
            if *shutdown.borrow() {
                stats.batches_skipped = batches.len() - index;
                tracing::info!(
                    remaining = stats.batches_skipped,
                    "Shutdown signalled, skipping remaining batches"
                );
                break;
            }

            match self.runner.run(batch, &shutdown).await {
                Ok(outcome) => {
                    tracing::debug!(
                        batch = index,
                        succeeded = outcome.succeeded,
                        failed = outcome.failed,
                        cancelled = outcome.cancelled,
                        "Batch finished"
                    );
                    stats.record_batch(&outcome);
                }
                Err(failure) => {
                    stats.record_batch_failure(&failure.outcome);
                    tracing::error!(
                        batch = index,
                        succeeded = failure.outcome.succeeded,
                        failed = failure.outcome.failed,
                        error = %failure.error,
                        "Batch failed"
                    );
                }
            }
        }

        stats.stop();
        tracing::info!(
            succeeded = stats.succeeded,
            failed = stats.failed,
            cancelled = stats.cancelled,
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            "Session finished"
        );

        Ok(stats)
    }

    /// Session identifier
    pub fn id(&self) -> usize {
        self.id
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("corpus", &self.corpus.name())
            .field("batches", &self.batches)
            .field("corpus_repeat", &self.corpus_repeat)
            .finish()
    }
}

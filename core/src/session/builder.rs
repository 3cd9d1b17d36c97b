//! Builder pattern for Session construction

use crate::error::{BenchError, BenchResult};
use crate::traits::CorpusBuilder;

use super::batch::BatchRunner;
use super::executor::Session;

use std::sync::Arc;

/// Builder for creating Session instances
///
/// # Example
/// ```ignore
/// let session = SessionBuilder::new(0)
///     .corpus(corpus)
///     .runner(runner)
///     .batches(10)
///     .corpus_repeat(2)
///     .build()?;
/// ```
pub struct SessionBuilder {
    id: usize,
    corpus: Option<Arc<dyn CorpusBuilder>>,
    runner: Option<BatchRunner>,
    batches: Option<usize>,
    corpus_repeat: usize,
}

impl SessionBuilder {
    /// Create a new builder with the given session ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            corpus: None,
            runner: None,
            batches: None,
            corpus_repeat: 2,
        }
    }

    /// Set the corpus builder
    pub fn corpus(mut self, corpus: Arc<dyn CorpusBuilder>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    /// Set the batch runner
    pub fn runner(mut self, runner: BatchRunner) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Set the number of batches
    pub fn batches(mut self, batches: usize) -> Self {
        self.batches = Some(batches);
        self
    }

    /// Set how many times the corpus repeats inside a batch
    pub fn corpus_repeat(mut self, repeat: usize) -> Self {
        self.corpus_repeat = repeat;
        self
    }

    /// Build the Session
    ///
    /// # Errors
    /// Returns an error if a required field is missing or a count is zero.
    pub fn build(self) -> BenchResult<Session> {
        let corpus = self.corpus.ok_or_else(|| BenchError::missing_config("corpus"))?;
        let runner = self.runner.ok_or_else(|| BenchError::missing_config("runner"))?;
        let batches = self
            .batches
            .ok_or_else(|| BenchError::missing_config("batches"))?;

        if batches == 0 || self.corpus_repeat == 0 {
            return Err(BenchError::config(
                "batches and corpus repeat must both be at least 1",
            ));
        }

        Ok(Session::new(
            self.id,
            corpus,
            runner,
            batches,
            self.corpus_repeat,
        ))
    }
}

//! Builder pattern for LoadController construction

use std::sync::Arc;

use indicatif::ProgressBar;

use crate::channel::ChannelConfig;
use crate::config::LoadTestConfig;
use crate::error::{BenchError, BenchResult};
use crate::traits::{CorpusBuilder, DurationPolicy, ProcessingClient};

use super::executor::LoadController;

/// Builder for creating a LoadController
///
/// # Example
///
/// ```ignore
/// let controller = LoadControllerBuilder::new()
///     .config(LoadTestConfig::new(5))
///     .client(client)
///     .corpus(corpus)
///     .progress(bar)
///     .build()?;
/// ```
pub struct LoadControllerBuilder {
    config: LoadTestConfig,
    client: Option<Arc<dyn ProcessingClient>>,
    corpus: Option<Arc<dyn CorpusBuilder>>,
    channel_config: ChannelConfig,
    progress: Option<ProgressBar>,
}

impl LoadControllerBuilder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LoadTestConfig::default(),
            client: None,
            corpus: None,
            channel_config: ChannelConfig::default(),
            progress: None,
        }
    }

    /// Set the full load test configuration
    pub fn config(mut self, config: LoadTestConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of concurrent sessions
    pub fn concurrency(mut self, sessions: usize) -> Self {
        self.config.num_concurrent = sessions;
        self
    }

    /// Set the number of batches per session
    pub fn batches_per_session(mut self, batches: usize) -> Self {
        self.config.batches_per_session = batches;
        self
    }

    /// Set the corpus repetition factor
    pub fn corpus_repeat(mut self, repeat: usize) -> Self {
        self.config.corpus_repeat = repeat;
        self
    }

    /// Set the duration and its policy
    pub fn duration(mut self, duration: std::time::Duration, policy: DurationPolicy) -> Self {
        self.config.duration = duration;
        self.config.duration_policy = policy;
        self
    }

    /// Set the processing client
    pub fn client(mut self, client: Arc<dyn ProcessingClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the corpus builder
    pub fn corpus(mut self, corpus: Arc<dyn CorpusBuilder>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    /// Set the channel configuration
    pub fn channel_config(mut self, config: ChannelConfig) -> Self {
        self.channel_config = config;
        self
    }

    /// Report per-request progress on `bar`
    pub fn progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Build the controller
    ///
    /// # Errors
    ///
    /// Returns an error if the client or corpus are not set, or if
    /// configuration validation fails.
    pub fn build(self) -> BenchResult<LoadController> {
        let client = self
            .client
            .ok_or_else(|| BenchError::missing_config("client"))?;

        let corpus = self
            .corpus
            .ok_or_else(|| BenchError::missing_config("corpus"))?;

        self.config
            .validate()
            .map_err(|e| BenchError::config(e.to_string()))?;

        if corpus.size_classes().is_empty() {
            return Err(BenchError::config("corpus has no size classes"));
        }

        Ok(LoadController::new(
            self.config,
            client,
            corpus,
            self.channel_config,
            self.progress,
        ))
    }
}

impl Default for LoadControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Load test configuration types

use crate::session::rate_period;
use crate::traits::DurationPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default number of requests allowed in flight across the whole run
pub const DEFAULT_MAX_IN_FLIGHT: usize = 1024;

/// Load test configuration
///
/// Defines how many simulated clients run, how much work each performs,
/// and how in-flight load is bounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadTestConfig {
    /// Number of concurrent sessions (simulated clients)
    pub num_concurrent: usize,

    /// Number of sequential batches each session runs
    pub batches_per_session: usize,

    /// How many times the corpus is repeated inside one batch
    pub corpus_repeat: usize,

    /// Upper bound on simultaneously issued requests, across all sessions
    pub max_in_flight: usize,

    /// Optional rate limiting (requests per second, across all sessions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<f64>,

    /// Intended test duration
    #[serde(with = "humantime_serde")]
    pub duration: Duration,

    /// Whether `duration` is informational or a deadline
    pub duration_policy: DurationPolicy,
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            num_concurrent: 5,
            batches_per_session: 10,
            corpus_repeat: 2,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            rate_limit: None,
            duration: Duration::from_secs(60),
            duration_policy: DurationPolicy::Advisory,
        }
    }
}

impl LoadTestConfig {
    /// Create a new config with the given number of concurrent sessions
    pub fn new(num_concurrent: usize) -> Self {
        Self {
            num_concurrent,
            ..Default::default()
        }
    }

    /// Load a config from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Unreadable(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| ConfigError::Unreadable(format!("{}: {e}", path.display())))
    }

    /// Set the number of batches per session
    pub fn with_batches_per_session(mut self, batches: usize) -> Self {
        self.batches_per_session = batches;
        self
    }

    /// Set the corpus repetition factor
    pub fn with_corpus_repeat(mut self, repeat: usize) -> Self {
        self.corpus_repeat = repeat;
        self
    }

    /// Set the in-flight request bound
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max;
        self
    }

    /// Set the rate limit
    pub fn with_rate_limit(mut self, rps: f64) -> Self {
        self.rate_limit = Some(rps);
        self
    }

    /// Set the test duration and how it is treated
    pub fn with_duration(mut self, duration: Duration, policy: DurationPolicy) -> Self {
        self.duration = duration;
        self.duration_policy = policy;
        self
    }

    /// Requests one session issues for a corpus of `corpus_len` documents
    pub fn requests_per_session(&self, corpus_len: usize) -> usize {
        self.batches_per_session * corpus_len * self.corpus_repeat
    }

    /// Requests the whole run issues for a corpus of `corpus_len` documents
    pub fn total_requests(&self, corpus_len: usize) -> usize {
        self.num_concurrent * self.requests_per_session(corpus_len)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_concurrent == 0 {
            return Err(ConfigError::InvalidConcurrency(
                "at least one concurrent session is required".into(),
            ));
        }

        if self.batches_per_session == 0 {
            return Err(ConfigError::InvalidWorkload(
                "batches per session must be at least 1".into(),
            ));
        }

        if self.corpus_repeat == 0 {
            return Err(ConfigError::InvalidWorkload(
                "corpus repeat factor must be at least 1".into(),
            ));
        }

        if self.max_in_flight == 0 {
            return Err(ConfigError::InvalidConcurrency(
                "max in-flight requests must be at least 1".into(),
            ));
        }

        if let Some(rps) = self.rate_limit {
            if rps <= 0.0 || !rps.is_finite() {
                return Err(ConfigError::InvalidRateLimit(
                    "rate limit must be positive".into(),
                ));
            }
            if rate_period(rps).is_none() {
                return Err(ConfigError::InvalidRateLimit(format!(
                    "{rps} requests/second has no representable non-zero interval"
                )));
            }
        }

        if self.duration_policy == DurationPolicy::Enforced && self.duration.is_zero() {
            return Err(ConfigError::InvalidDuration(
                "an enforced duration must be non-zero".into(),
            ));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid concurrency value
    #[error("Invalid concurrency: {0}")]
    InvalidConcurrency(String),

    /// Invalid amount of work per session
    #[error("Invalid workload: {0}")]
    InvalidWorkload(String),

    /// Invalid rate limit
    #[error("Invalid rate limit: {0}")]
    InvalidRateLimit(String),

    /// Invalid duration
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Config file missing or not valid JSON
    #[error("Unreadable config: {0}")]
    Unreadable(String),
}

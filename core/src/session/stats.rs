//! Per-session request and batch counters

use std::time::{Duration, Instant};

/// Requests finished by one batch, by outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Requests whose metrics reached the store
    pub succeeded: usize,
    /// Requests that failed (including panicked request tasks)
    pub failed: usize,
    /// Requests skipped or abandoned because of shutdown
    pub cancelled: usize,
}

impl BatchOutcome {
    /// All requests the batch accounted for
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.cancelled
    }
}

/// Statistics tracked by each session
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Session identifier
    pub session_id: usize,
    /// Requests that produced metrics
    pub succeeded: usize,
    /// Requests that failed
    pub failed: usize,
    /// Requests cancelled by shutdown
    pub cancelled: usize,
    /// Batches that ran to completion
    pub batches_completed: usize,
    /// Batches that ended with a batch-level error
    pub batches_failed: usize,
    /// Batches never started because shutdown was signalled
    pub batches_skipped: usize,
    /// Session start time
    pub started_at: Option<Instant>,
    /// Session end time
    pub ended_at: Option<Instant>,
}

impl SessionStats {
    /// Empty stats for `session_id`
    pub fn new(session_id: usize) -> Self {
        Self {
            session_id,
            ..Default::default()
        }
    }

    /// Record the start time
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Record the end time
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Fold a finished batch into the counters
    pub fn record_batch(&mut self, outcome: &BatchOutcome) {
        self.succeeded += outcome.succeeded;
        self.failed += outcome.failed;
        self.cancelled += outcome.cancelled;
        self.batches_completed += 1;
    }

    /// Fold a batch that ended with a batch-level error into the counters
    pub fn record_batch_failure(&mut self, partial: &BatchOutcome) {
        self.succeeded += partial.succeeded;
        self.failed += partial.failed;
        self.cancelled += partial.cancelled;
        self.batches_failed += 1;
    }

    /// Whether shutdown cut this session short
    ///
    /// True when a batch was skipped or a request was cancelled. A session
    /// that finished its last batch before shutdown was signalled is not
    /// interrupted.
    pub fn interrupted(&self) -> bool {
        self.batches_skipped > 0 || self.cancelled > 0
    }

    /// Requests that were actually issued and finished (succeeded + failed)
    pub fn completed_requests(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Every request accounted for, cancelled ones included
    pub fn attempted(&self) -> usize {
        self.completed_requests() + self.cancelled
    }

    /// Fraction of completed requests that succeeded
    pub fn success_rate(&self) -> f64 {
        let total = self.completed_requests();
        if total == 0 {
            0.0
        } else {
            self.succeeded as f64 / total as f64
        }
    }

    /// Elapsed time since start
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }
}

//! Result aggregation across sessions

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BenchResult;
use crate::metrics::{ProcessingMetrics, RunResult, RunSummary};
use crate::session::SessionStats;

/// Request totals across every session of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionTotals {
    /// Sessions that returned stats
    pub sessions: usize,
    /// Sessions that ended with an error or panicked
    pub failed_sessions: usize,
    /// Requests accounted for, cancelled ones included
    pub attempted: usize,
    /// Requests that produced metrics
    pub succeeded: usize,
    /// Requests that failed
    pub failed: usize,
    /// Requests cancelled by shutdown
    pub cancelled: usize,
    /// Batches that ended with a batch-level error
    pub batches_failed: usize,
    /// Successful requests per second of wall-clock run time
    pub requests_per_second: f64,
}

impl SessionTotals {
    /// Fraction of issued requests that succeeded
    pub fn success_rate(&self) -> f64 {
        let issued = self.succeeded + self.failed;
        if issued > 0 {
            self.succeeded as f64 / issued as f64
        } else {
            0.0
        }
    }
}

/// Sum session counters over a run of `run_duration`
pub fn aggregate_session_stats(
    stats: &[SessionStats],
    failed_sessions: usize,
    run_duration: Duration,
) -> SessionTotals {
    let succeeded: usize = stats.iter().map(|s| s.succeeded).sum();
    let secs = run_duration.as_secs_f64();

    SessionTotals {
        sessions: stats.len(),
        failed_sessions,
        attempted: stats.iter().map(|s| s.attempted()).sum(),
        succeeded,
        failed: stats.iter().map(|s| s.failed).sum(),
        cancelled: stats.iter().map(|s| s.cancelled).sum(),
        batches_failed: stats.iter().map(|s| s.batches_failed).sum(),
        requests_per_second: if secs > 0.0 {
            succeeded as f64 / secs
        } else {
            0.0
        },
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Collected metrics
    pub result: RunResult,
    /// Stats of every session that returned
    pub sessions: Vec<SessionStats>,
    /// Sessions that ended with an error or panicked
    pub failed_sessions: usize,
    /// Measured wall-clock duration
    pub duration: Duration,
    /// Whether shutdown (signal or enforced deadline) cut the run short
    pub interrupted: bool,
}

impl RunReport {
    /// Read-only view of the collected records
    pub fn records(&self) -> &[ProcessingMetrics] {
        self.result.records()
    }

    /// Statistics over the collected records
    ///
    /// # Errors
    /// `NoDataCollected` when no request succeeded.
    pub fn summary(&self) -> BenchResult<RunSummary> {
        RunSummary::from_records(self.records(), self.duration)
    }

    /// Request totals across sessions
    pub fn totals(&self) -> SessionTotals {
        aggregate_session_stats(&self.sessions, self.failed_sessions, self.duration)
    }
}

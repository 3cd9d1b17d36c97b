//! Human-readable run summary

use std::fmt::Write;

use docbench_core::{LoadTestConfig, RunSummary, SessionTotals};

const RULE_WIDTH: usize = 60;

/// Shape of the run, shown alongside the statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunParameters {
    /// Concurrent sessions
    pub sessions: usize,
    /// Sequential batches per session
    pub batches_per_session: usize,
    /// Documents issued per batch (corpus size times repetition)
    pub documents_per_batch: usize,
}

impl RunParameters {
    /// Parameters of a run over a corpus of `corpus_len` documents
    pub fn from_config(config: &LoadTestConfig, corpus_len: usize) -> Self {
        Self {
            sessions: config.num_concurrent,
            batches_per_session: config.batches_per_session,
            documents_per_batch: corpus_len * config.corpus_repeat,
        }
    }
}

/// Console report printed at the end of a run
pub struct ConsoleSummary;

impl ConsoleSummary {
    /// Render the summary of a run that collected data
    pub fn render(
        summary: &RunSummary,
        totals: &SessionTotals,
        params: &RunParameters,
    ) -> String {
        let mut out = String::new();
        let rule = "=".repeat(RULE_WIDTH);

        // Writing to a String cannot fail
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "   Load Test Summary");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Total operations:     {}", summary.total_operations);
        let _ = writeln!(out, "Run duration:         {:.2}s", summary.run_duration_secs);
        let _ = writeln!(
            out,
            "Operations/second:    {:.2}",
            summary.operations_per_second()
        );
        render_parameters(&mut out, params);

        let _ = writeln!(out, "\nTiming (seconds)");
        let _ = writeln!(
            out,
            "  Total time:         mean {:.4}  median {:.4}  p95 {:.4}  min {:.4}  max {:.4}",
            summary.total_time.mean,
            summary.total_time.median,
            summary.total_time_p95,
            summary.total_time.min,
            summary.total_time.max
        );
        let _ = writeln!(
            out,
            "  Processing time:    mean {:.4}  median {:.4}  min {:.4}  max {:.4}",
            summary.processing_time.mean,
            summary.processing_time.median,
            summary.processing_time.min,
            summary.processing_time.max
        );
        let _ = writeln!(
            out,
            "  Chunking time:      mean {:.4}  median {:.4}  min {:.4}  max {:.4}",
            summary.chunking_time.mean,
            summary.chunking_time.median,
            summary.chunking_time.min,
            summary.chunking_time.max
        );

        let _ = writeln!(out, "\nThroughput (ops/s per request)");
        let _ = writeln!(
            out,
            "  mean {:.2}  median {:.2}  min {:.2}  max {:.2}",
            summary.throughput.mean,
            summary.throughput.median,
            summary.throughput.min,
            summary.throughput.max
        );

        let _ = writeln!(out, "\nChunking");
        let _ = writeln!(
            out,
            "  Chunks/document:    mean {:.1}  min {:.0}  max {:.0}",
            summary.total_chunks.mean, summary.total_chunks.min, summary.total_chunks.max
        );
        let _ = writeln!(
            out,
            "  Successful chunks:  mean {:.1}  min {:.0}  max {:.0}",
            summary.successful_chunks.mean,
            summary.successful_chunks.min,
            summary.successful_chunks.max
        );
        let _ = writeln!(
            out,
            "  Quality score:      mean {:.3}",
            summary.avg_quality_score.mean
        );
        let _ = writeln!(
            out,
            "  Info density:       mean {:.3}",
            summary.avg_information_density.mean
        );
        let _ = writeln!(out, "  Success rate:       {:.1}%", summary.success_rate * 100.0);

        render_totals(&mut out, totals);
        let _ = writeln!(out, "{rule}");
        out
    }

    /// Render the report for a run in which no request succeeded
    pub fn render_no_data(totals: &SessionTotals, params: &RunParameters) -> String {
        let mut out = String::new();
        let rule = "=".repeat(RULE_WIDTH);

        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "   No data collected");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "Every request failed or was cancelled; no statistics to report."
        );
        render_parameters(&mut out, params);
        render_totals(&mut out, totals);
        let _ = writeln!(out, "{rule}");
        out
    }

    /// Print [`render`](Self::render) to stdout
    pub fn print(summary: &RunSummary, totals: &SessionTotals, params: &RunParameters) {
        print!("{}", Self::render(summary, totals, params));
    }

    /// Print [`render_no_data`](Self::render_no_data) to stdout
    pub fn print_no_data(totals: &SessionTotals, params: &RunParameters) {
        print!("{}", Self::render_no_data(totals, params));
    }
}

fn render_parameters(out: &mut String, params: &RunParameters) {
    let _ = writeln!(out, "Concurrent sessions:  {}", params.sessions);
    let _ = writeln!(out, "Batches per session:  {}", params.batches_per_session);
    let _ = writeln!(out, "Documents per batch:  {}", params.documents_per_batch);
}

fn render_totals(out: &mut String, totals: &SessionTotals) {
    let _ = writeln!(out, "\nRequests");
    let _ = writeln!(
        out,
        "  Attempted {}  succeeded {}  failed {}  cancelled {}",
        totals.attempted, totals.succeeded, totals.failed, totals.cancelled
    );
    let _ = writeln!(
        out,
        "  Sessions {} ({} failed), batches failed {}",
        totals.sessions, totals.failed_sessions, totals.batches_failed
    );
    let _ = writeln!(out, "  Requests/second: {:.2}", totals.requests_per_second);
}

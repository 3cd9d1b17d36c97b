//! Sizing of the channel between batch runners and the metrics collector

use tokio::sync::mpsc;

use crate::metrics::{MetricsSender, ProcessingMetrics};

/// Records buffered before senders start waiting on the collector
pub const DEFAULT_METRICS_BUFFER: usize = 10_000;

/// Metrics channel settings
///
/// The channel is bounded: when the collector falls behind, request tasks
/// wait to hand over their record rather than dropping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Capacity of the metrics channel, at least 1
    pub metrics_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            metrics_buffer: DEFAULT_METRICS_BUFFER,
        }
    }
}

impl ChannelConfig {
    /// Use a capacity of `size`; zero is raised to one
    pub fn with_metrics_buffer(mut self, size: usize) -> Self {
        self.metrics_buffer = size.max(1);
        self
    }

    /// Open the metrics channel
    pub fn metrics_channel(&self) -> (MetricsSender, mpsc::Receiver<ProcessingMetrics>) {
        mpsc::channel(self.metrics_buffer.max(1))
    }
}

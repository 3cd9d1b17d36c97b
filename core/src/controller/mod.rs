//! LoadController for run lifecycle management
//!
//! The LoadController coordinates a complete load test:
//! - Spawning one task per session
//! - Bounding in-flight requests via a shared semaphore
//! - Managing graceful shutdown via a watch channel
//! - Owning the single-writer metrics collector
//!
//! # Example
//!
//! ```ignore
//! use docbench_core::{LoadControllerBuilder, LoadTestConfig};
//!
//! let controller = LoadControllerBuilder::new()
//!     .config(LoadTestConfig::new(5))
//!     .client(client)
//!     .corpus(corpus)
//!     .build()?;
//!
//! controller.preflight().await?;
//! let report = controller.run_with_signal_handling().await?;
//! ```

mod aggregator;
mod builder;
mod executor;

pub use aggregator::{aggregate_session_stats, RunReport, SessionTotals};
pub use builder::LoadControllerBuilder;
pub use executor::LoadController;

#[cfg(test)]
mod tests;

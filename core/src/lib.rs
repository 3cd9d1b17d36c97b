//! docbench-core: load-generation engine for document-processing services
//!
//! This crate provides the types and the concurrent engine shared by every
//! docbench component:
//!
//! - Data model (documents, server reports, per-operation metrics)
//! - Core traits (ProcessingClient, CorpusBuilder)
//! - Request execution, batches, sessions and the LoadController
//! - Metrics collection and aggregation
//! - Error handling and configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod metrics;
pub mod request;
pub mod response;
pub mod session;
pub mod traits;

pub use channel::{ChannelConfig, DEFAULT_METRICS_BUFFER};
pub use config::{ConfigError, LoadTestConfig, DEFAULT_MAX_IN_FLIGHT};
pub use controller::{
    aggregate_session_stats, LoadController, LoadControllerBuilder, RunReport, SessionTotals,
};
pub use document::{build_batches, TestDocument};
pub use error::*;
pub use metrics::*;
pub use request::{RequestExecutor, RequestFailed, RequestOutcome};
pub use response::ServerReport;
pub use session::{
    BatchFailure, BatchOutcome, BatchRunner, RequestRateLimiter, Session, SessionBuilder,
    SessionStats,
};
pub use traits::*;

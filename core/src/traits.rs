//! Core traits for processing clients and corpus builders
//!
//! These traits are defined in core to avoid circular dependencies.
//! Implementations live in their respective crates (client/, corpus/).

use crate::document::TestDocument;
use crate::error::ErrorKind;
use crate::response::ServerReport;
use async_trait::async_trait;
use std::time::Duration;

// ============================================================================
// Processing Client Trait
// ============================================================================

/// Client for the remote document-processing service
///
/// Implementations own the wire format; the engine only sees a
/// [`ServerReport`] or a [`ClientError`].
#[async_trait]
pub trait ProcessingClient: Send + Sync {
    /// Base URL of the target service
    fn base_url(&self) -> &str;

    /// Submit one document and wait for the complete, parsed response
    async fn process(&self, document: &TestDocument) -> Result<ServerReport, ClientError>;

    /// Check that the service is reachable and healthy
    async fn health_check(&self) -> Result<(), ClientError>;
}

/// Cause of a failed processing request
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP/network error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The service answered but reported `success: false`
    #[error("Rejected by service: {0}")]
    Rejected(String),

    /// Body could not be parsed into the expected shape
    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Local IO error while reading the staged document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Convert to ErrorKind for logging/classification
    pub fn to_error_kind(&self) -> ErrorKind {
        match self {
            ClientError::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            ClientError::Http(e) if e.is_decode() => ErrorKind::InvalidResponse,
            ClientError::Http(_) => ErrorKind::ConnectionError,
            ClientError::Status { status, .. } if *status >= 500 => ErrorKind::ServerError,
            ClientError::Status { .. } => ErrorKind::ClientError,
            ClientError::Rejected(_) => ErrorKind::Rejected,
            ClientError::MalformedBody(_) => ErrorKind::InvalidResponse,
            ClientError::Timeout(_) => ErrorKind::Timeout,
            ClientError::Io(_) => ErrorKind::Io,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.to_error_kind().is_retryable()
    }
}

// ============================================================================
// Corpus Builder Trait
// ============================================================================

/// Produces the fixed document set a session reuses across its batches
#[async_trait]
pub trait CorpusBuilder: Send + Sync {
    /// Builder name for identification
    fn name(&self) -> &str;

    /// Size classes (KB) this builder produces, one document each
    fn size_classes(&self) -> &[u32];

    /// Generate and stage the corpus for one session
    ///
    /// Called once per session. Staged file names must be distinct per
    /// `session_id` so that concurrent sessions never overwrite each other.
    async fn build(&self, session_id: usize) -> Result<Vec<TestDocument>, GenerationError>;
}

/// Corpus generation errors
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Invalid builder configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error (e.g. writing to the staging area)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Duration Policy
// ============================================================================

/// How the configured test duration is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPolicy {
    /// Informational only; sessions run every batch to completion
    #[default]
    Advisory,

    /// Deadline; reaching it triggers the same shutdown as Ctrl+C
    Enforced,
}

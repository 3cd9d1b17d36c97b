//! Error types for docbench-core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed processing request
///
/// Used for log fields and failure breakdowns; the full cause travels
/// alongside it as a [`ClientError`](crate::traits::ClientError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Could not connect or the transport broke mid-request
    ConnectionError,
    /// Request exceeded the client timeout
    Timeout,
    /// Service answered with a 5xx status
    ServerError,
    /// Service answered with a 4xx status
    ClientError,
    /// Service answered 2xx but reported `success: false`
    Rejected,
    /// Body was not the JSON shape the service promises
    InvalidResponse,
    /// Local file could not be read before submission
    Io,
}

impl ErrorKind {
    /// Whether repeating the request could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::ConnectionError | ErrorKind::Timeout | ErrorKind::ServerError
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::ConnectionError => "connection_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ServerError => "server_error",
            ErrorKind::ClientError => "client_error",
            ErrorKind::Rejected => "rejected",
            ErrorKind::InvalidResponse => "invalid_response",
            ErrorKind::Io => "io",
        };
        f.write_str(s)
    }
}

/// Category of a [`BenchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchErrorKind {
    /// Invalid configuration
    Config,
    /// Builder was missing a required component
    MissingConfig,
    /// Corpus could not be generated or staged
    Generation,
    /// A session ended without finishing its batch loop
    Session,
    /// Aggregation was asked to summarize an empty run
    NoDataCollected,
    /// The run could not start at all (unreachable service, no staging area)
    Setup,
    /// Work was abandoned because shutdown was signalled
    Shutdown,
    /// Local IO failure
    Io,
    /// A background task of the engine itself failed
    Internal,
}

/// Core error type
#[derive(Error, Debug)]
#[error("{kind:?}: {message}")]
pub struct BenchError {
    /// Error category
    pub kind: BenchErrorKind,
    /// Human-readable detail
    pub message: String,
}

impl BenchError {
    fn new(kind: BenchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Invalid configuration
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(BenchErrorKind::Config, message)
    }

    /// A required builder field was not set
    pub fn missing_config(field: &str) -> Self {
        Self::new(
            BenchErrorKind::MissingConfig,
            format!("missing required field: {field}"),
        )
    }

    /// Corpus generation failure
    pub fn generation(message: impl Into<String>) -> Self {
        Self::new(BenchErrorKind::Generation, message)
    }

    /// Session-level failure
    pub fn session(session_id: usize, message: impl Into<String>) -> Self {
        Self::new(
            BenchErrorKind::Session,
            format!("session {session_id}: {}", message.into()),
        )
    }

    /// No metrics were collected during the run
    pub fn no_data() -> Self {
        Self::new(
            BenchErrorKind::NoDataCollected,
            "no metrics collected during test",
        )
    }

    /// Fatal setup error
    pub fn setup(message: impl Into<String>) -> Self {
        Self::new(BenchErrorKind::Setup, message)
    }

    /// Engine task failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(BenchErrorKind::Internal, message)
    }

    /// Shutdown in progress
    pub fn shutdown() -> Self {
        Self::new(BenchErrorKind::Shutdown, "shutdown in progress")
    }

    /// Whether this is the "no data collected" outcome
    pub fn is_no_data(&self) -> bool {
        self.kind == BenchErrorKind::NoDataCollected
    }

    /// Whether this error means the run could not start
    pub fn is_fatal_setup(&self) -> bool {
        matches!(
            self.kind,
            BenchErrorKind::Setup | BenchErrorKind::Config | BenchErrorKind::MissingConfig
        )
    }
}

impl From<std::io::Error> for BenchError {
    fn from(e: std::io::Error) -> Self {
        Self::new(BenchErrorKind::Io, e.to_string())
    }
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_names_field() {
        let err = BenchError::missing_config("client");
        assert_eq!(err.kind, BenchErrorKind::MissingConfig);
        assert!(err.message.contains("client"));
        assert!(err.is_fatal_setup());
    }

    #[test]
    fn test_no_data_is_distinct() {
        let err = BenchError::no_data();
        assert!(err.is_no_data());
        assert!(!err.is_fatal_setup());
    }

    #[test]
    fn test_session_error_carries_id() {
        let err = BenchError::session(3, "corpus unavailable");
        assert_eq!(err.kind, BenchErrorKind::Session);
        assert_eq!(err.message, "session 3: corpus unavailable");
    }

    #[test]
    fn test_error_kind_retryable() {
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(ErrorKind::ServerError.is_retryable());
        assert!(!ErrorKind::Rejected.is_retryable());
        assert!(!ErrorKind::InvalidResponse.is_retryable());
    }

    #[test]
    fn test_error_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::InvalidResponse).unwrap();
        assert_eq!(json, "\"invalid_response\"");
        assert_eq!(ErrorKind::InvalidResponse.to_string(), "invalid_response");
    }
}

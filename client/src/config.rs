//! Client configuration and submission modes

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// A required configuration field is missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The base URL is not an http(s) URL.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// A timeout value is out of acceptable range.
    #[error("invalid timeout: {0:?}")]
    InvalidTimeout(Duration),

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

// ============================================================================
// Submit Mode
// ============================================================================

/// How a document is sent to `POST /process`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmitMode {
    /// Multipart upload with a `file` part named after the staged file
    #[default]
    Multipart,
    /// JSON body `{"file_content": ...}`
    FileContent,
    /// JSON body `{"file_path": ...}`; the service reads the file itself
    FilePath,
}

impl SubmitMode {
    /// Returns the identifier string for this mode.
    pub fn id(&self) -> &'static str {
        match self {
            SubmitMode::Multipart => "multipart",
            SubmitMode::FileContent => "file-content",
            SubmitMode::FilePath => "file-path",
        }
    }

    /// Whether the client reads the staged file before submitting.
    pub fn reads_local_file(&self) -> bool {
        !matches!(self, SubmitMode::FilePath)
    }
}

impl std::fmt::Display for SubmitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for SubmitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multipart" | "upload" => Ok(SubmitMode::Multipart),
            "file-content" | "file_content" | "content" => Ok(SubmitMode::FileContent),
            "file-path" | "file_path" | "path" => Ok(SubmitMode::FilePath),
            _ => Err(format!("Unknown submit mode: {}", s)),
        }
    }
}

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration for creating an [`HttpProcessClient`](crate::HttpProcessClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the service (no trailing slash needed)
    pub base_url: String,

    /// Document submission mode
    #[serde(default)]
    pub submit_mode: SubmitMode,

    /// Request timeout
    #[serde(default = "default_request_timeout")]
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Connection timeout
    #[serde(default = "default_connect_timeout")]
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Maximum idle connections kept per host
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_pool_max_idle() -> usize {
    32
}

impl ClientConfig {
    /// Create a config for `base_url` with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            submit_mode: SubmitMode::default(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            pool_max_idle_per_host: default_pool_max_idle(),
        }
    }

    /// Set the submission mode.
    pub fn with_submit_mode(mut self, mode: SubmitMode) -> Self {
        self.submit_mode = mode;
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the idle pool size.
    pub fn with_pool_max_idle(mut self, max_idle: usize) -> Self {
        self.pool_max_idle_per_host = max_idle;
        self
    }

    /// Base URL without a trailing slash.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let url = self.normalized_base_url();
        if url.is_empty() {
            return Err(ConfigValidationError::MissingField("base_url"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigValidationError::InvalidUrl(self.base_url.clone()));
        }

        // 1s to 1h for request, 1s to 5m for connect
        if self.request_timeout < Duration::from_secs(1)
            || self.request_timeout > Duration::from_secs(3600)
        {
            return Err(ConfigValidationError::InvalidTimeout(self.request_timeout));
        }
        if self.connect_timeout < Duration::from_secs(1)
            || self.connect_timeout > Duration::from_secs(300)
        {
            return Err(ConfigValidationError::InvalidTimeout(self.connect_timeout));
        }

        Ok(())
    }
}

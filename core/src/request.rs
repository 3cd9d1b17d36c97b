//! Single-request execution and timing

use crate::document::TestDocument;
use crate::error::ErrorKind;
use crate::metrics::ProcessingMetrics;
use crate::traits::{ClientError, ProcessingClient};

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// A request that did not produce metrics
#[derive(Debug, thiserror::Error)]
#[error("{} ({size_kb}kb) failed [{kind}]: {cause}", .path.display())]
pub struct RequestFailed {
    /// Staged path of the document
    pub path: PathBuf,
    /// Size class of the document
    pub size_kb: u32,
    /// Failure classification
    pub kind: ErrorKind,
    /// Underlying cause
    #[source]
    pub cause: ClientError,
}

impl RequestFailed {
    fn new(document: &TestDocument, cause: ClientError) -> Self {
        Self {
            path: document.path().to_path_buf(),
            size_kb: document.size_kb(),
            kind: cause.to_error_kind(),
            cause,
        }
    }
}

/// Outcome of one request
pub type RequestOutcome = Result<ProcessingMetrics, RequestFailed>;

/// Issues single processing requests and turns responses into metrics
///
/// Cloning is cheap; clones share the client and the operation counter so
/// operation ids stay unique across the whole run.
#[derive(Clone)]
pub struct RequestExecutor {
    client: Arc<dyn ProcessingClient>,
    sequence: Arc<AtomicU64>,
}

impl RequestExecutor {
    /// Create an executor around a processing client
    pub fn new(client: Arc<dyn ProcessingClient>) -> Self {
        Self {
            client,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The underlying client
    pub fn client(&self) -> &Arc<dyn ProcessingClient> {
        &self.client
    }

    /// Submit `document` once and time the full round trip
    pub async fn execute(&self, document: &TestDocument) -> RequestOutcome {
        let operation_id = self.next_operation_id();

        let start = Instant::now();
        let result = self.client.process(document).await;
        let elapsed = start.elapsed();

        match result {
            Ok(report) => Ok(ProcessingMetrics::from_report(operation_id, elapsed, &report)),
            Err(cause) => Err(RequestFailed::new(document, cause)),
        }
    }

    /// Operations issued so far by this executor and its clones
    pub fn issued(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }

    fn next_operation_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        format!("op_{millis}_{seq}")
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("client", &self.client.base_url())
            .field("issued", &self.issued())
            .finish()
    }
}

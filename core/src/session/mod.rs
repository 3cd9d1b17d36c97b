//! Sessions: simulated clients driving sequential batches
//!
//! A session builds its corpus once, then runs `batches` batches one after
//! another. Each batch is the corpus repeated `corpus_repeat` times, and the
//! [`BatchRunner`] issues every document of the batch concurrently.
//!
//! ```ignore
//! let runner = BatchRunner::new(executor, metrics_tx, semaphore, rate_limiter);
//! let session = SessionBuilder::new(0)
//!     .corpus(corpus)
//!     .runner(runner)
//!     .batches(10)
//!     .build()?;
//!
//! let stats = session.run(shutdown_rx).await?;
//! ```

mod batch;
mod builder;
mod executor;
mod rate_limiter;
mod stats;

pub use batch::{BatchFailure, BatchRunner};
pub use builder::SessionBuilder;
pub use executor::Session;
pub use rate_limiter::{rate_period, RequestRateLimiter};
pub use stats::{BatchOutcome, SessionStats};

use tokio::sync::watch;

/// Resolve once shutdown is signalled
///
/// Never resolves if the sender is dropped without signalling.
pub(crate) async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

//! In-process task dispatcher
//!
//! Reference implementation of the dispatcher port: a bounded channel feeding
//! a worker pool in the same process. Delivery is at-least-once from the
//! worker's point of view (the worker re-reads persisted state and must stay
//! idempotent); there is no ordering or timing guarantee.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use catalog_core::error::DomainError;
use catalog_core::repositories::{TaskDispatcher, ThumbnailJob};

#[derive(Clone)]
pub struct InProcessDispatcher {
    tx: mpsc::Sender<ThumbnailJob>,
}

impl InProcessDispatcher {
    /// Build the dispatcher and the receiving end the worker pool consumes.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ThumbnailJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Broker liveness view for the health probe: the channel is alive while
    /// the consuming side has not been dropped.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

#[async_trait]
impl TaskDispatcher for InProcessDispatcher {
    async fn enqueue(&self, job: ThumbnailJob) -> Result<(), DomainError> {
        // Backpressure: a full queue blocks the sender rather than dropping
        // the job. Delivery timing is not guaranteed.
        self.tx
            .send(job)
            .await
            .map_err(|_| DomainError::QueueError("dispatcher channel closed".into()))?;

        debug!("Enqueued thumbnail job for {}", job.product_id);
        Ok(())
    }
}

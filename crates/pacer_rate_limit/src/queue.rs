//! Bounded FIFO between submitters and the dispatcher.

use crate::PendingRequest;
use pacer_error::{DispatchError, DispatchErrorKind, PacerResult};
use tokio::sync::mpsc;
use tracing::trace;

/// Producer side of the request buffer.
///
/// Submitting to a full queue waits for space rather than dropping the
/// request. Clones share the same buffer.
#[derive(Debug, Clone)]
pub struct RequestQueue {
    sender: mpsc::Sender<PendingRequest>,
}

impl RequestQueue {
    /// Create a queue holding up to `capacity` requests.
    ///
    /// Returns the producer handle and the receiver that the single consumer
    /// drains.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. `DispatcherConfig::validate` rejects
    /// that value before a queue is built.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<PendingRequest>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Append a new request, waiting while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` if the consumer is gone.
    pub async fn submit(&self, request: PendingRequest) -> PacerResult<()> {
        self.sender
            .send(request)
            .await
            .map_err(|_| DispatchError::new(DispatchErrorKind::QueueClosed))?;
        trace!(capacity_left = self.sender.capacity(), "Request queued");
        Ok(())
    }

    /// Put a rejected request back at the tail of the queue.
    ///
    /// Hands the request back if the consumer is gone so the caller can
    /// complete it.
    pub async fn resubmit(&self, request: PendingRequest) -> Result<(), PendingRequest> {
        self.sender.send(request).await.map_err(|e| e.0)
    }
}

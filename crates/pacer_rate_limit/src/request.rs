//! Pending requests and the handles callers await.

use futures::task::AtomicWaker;
use pacer_core::ApiResponse;
use pacer_error::{DispatchError, DispatchErrorKind, PacerResult};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::trace;

#[derive(Debug, Default)]
struct CancelState {
    canceled: AtomicBool,
    waker: AtomicWaker,
}

/// Shared cancellation flag of one request.
///
/// Set at most once by the caller; read by the dispatcher before admitting
/// the request and again right before sending it. Cloning shares the flag,
/// so a token can be handed to another task while the handle is awaited.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

impl CancelToken {
    /// Mark the request canceled. Returns `false` if it already was.
    pub fn cancel(&self) -> bool {
        let first = !self.state.canceled.swap(true, Ordering::AcqRel);
        if first {
            self.state.waker.wake();
        }
        first
    }

    /// Whether the request has been canceled.
    pub fn is_canceled(&self) -> bool {
        self.state.canceled.load(Ordering::Acquire)
    }
}

/// A request waiting to be sent, owned by one component at a time.
///
/// It moves from the queue to the dispatcher to a send task, and back to
/// the queue if the server answers 429. Completing it consumes it, so a
/// request cannot be both completed and re-queued.
#[derive(Debug)]
pub struct PendingRequest {
    target: String,
    authenticated: bool,
    cancel: CancelToken,
    completion: oneshot::Sender<PacerResult<ApiResponse>>,
}

impl PendingRequest {
    /// Create a request and the handle its caller awaits.
    pub fn new(target: impl Into<String>, authenticated: bool) -> (Self, ResponseHandle) {
        let (completion, receiver) = oneshot::channel();
        let cancel = CancelToken::default();
        let request = Self {
            target: target.into(),
            authenticated,
            cancel: cancel.clone(),
            completion,
        };
        let handle = ResponseHandle { cancel, receiver };
        (request, handle)
    }

    /// URL to GET.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether the credential is attached.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Whether the caller canceled the request.
    pub fn is_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }

    /// Deliver the final result to the caller.
    pub fn complete(self, result: PacerResult<ApiResponse>) {
        if self.completion.send(result).is_err() {
            trace!(url = %self.target, "Caller detached before completion");
        }
    }
}

/// Future resolving to the response of a submitted request.
///
/// Canceling (through [`ResponseHandle::cancel`], a [`CancelToken`], or by
/// dropping the handle) resolves it to a `Canceled` error. A request that is
/// still queued is then never sent. A request already on the wire is not
/// aborted; its response is discarded.
///
/// If the dispatcher shuts down first, the handle resolves to a `Shutdown`
/// error.
#[derive(Debug)]
pub struct ResponseHandle {
    cancel: CancelToken,
    receiver: oneshot::Receiver<PacerResult<ApiResponse>>,
}

impl ResponseHandle {
    /// Cancel the request. Returns `false` if it was already canceled.
    pub fn cancel(&self) -> bool {
        self.cancel.cancel()
    }

    /// Whether the request has been canceled.
    pub fn is_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }

    /// A token that cancels this request from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

impl Future for ResponseHandle {
    type Output = PacerResult<ApiResponse>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.cancel.state.waker.register(cx.waker());
        if self.cancel.is_canceled() {
            return Poll::Ready(Err(DispatchError::new(DispatchErrorKind::Canceled).into()));
        }

        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => {
                Poll::Ready(Err(DispatchError::new(DispatchErrorKind::Shutdown).into()))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ResponseHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completion_reaches_handle() {
        let (request, handle) = PendingRequest::new("https://api.example.com/a", false);
        assert_eq!(request.target(), "https://api.example.com/a");
        assert!(!request.is_authenticated());

        request.complete(Ok(ApiResponse::new(200, "body".to_string())));
        let response = handle.await.unwrap();
        assert_eq!(*response.status(), 200);
        assert_eq!(response.body(), "body");
    }

    #[tokio::test]
    async fn test_cancel_is_visible_to_request() {
        let (request, handle) = PendingRequest::new("https://api.example.com/a", true);
        assert!(!request.is_canceled());

        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert!(request.is_canceled());

        let err = handle.await.unwrap_err();
        assert!(err.is_canceled());
    }

    #[tokio::test]
    async fn test_cancel_token_wakes_pending_handle() {
        let (_request, handle) = PendingRequest::new("https://api.example.com/a", false);
        let token = handle.cancel_token();

        let waiter = tokio::spawn(handle);
        tokio::task::yield_now().await;
        token.cancel();

        let err = waiter.await.unwrap().unwrap_err();
        assert!(err.is_canceled());
    }

    #[tokio::test]
    async fn test_dropped_request_reports_shutdown() {
        let (request, handle) = PendingRequest::new("https://api.example.com/a", false);
        drop(request);

        let err = handle.await.unwrap_err();
        assert!(!err.is_canceled());
        assert!(err.to_string().contains("shut down"));
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels() {
        let (request, handle) = PendingRequest::new("https://api.example.com/a", false);
        drop(handle);
        assert!(request.is_canceled());
    }
}

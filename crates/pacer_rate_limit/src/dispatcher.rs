//! The dispatcher: a single background worker pacing requests to the server.
//!
//! Many callers submit concurrently; exactly one worker drains the queue.
//! For each request the worker:
//!
//! 1. skips it if it was canceled while queued (no permit taken yet),
//! 2. waits for a permit from the [`AdmissionGate`],
//! 3. waits out the minimum delay since the previous send,
//! 4. refunds the permit and drops the request if it was canceled meanwhile,
//! 5. otherwise hands it to a send task and moves on.
//!
//! The send task calls the transport and runs the [`ResponseClassifier`].
//! Because permits are taken before the send task is spawned, they are
//! consumed in dispatch order even though responses may arrive out of order.
//!
//! A send that gets no response at all hands its permit back only when it
//! was the probe of the current, still unlearned window. Otherwise that
//! window would never be calibrated or reset.

use crate::{
    AdmissionGate, DispatcherConfig, PendingRequest, RequestQueue, ResetScheduler,
    ResponseClassifier, ResponseHandle, WindowSnapshot,
};
use pacer_core::Credential;
use pacer_error::{ConfigError, DispatchError, DispatchErrorKind, PacerResult};
use pacer_interface::Transport;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{Instrument, debug, debug_span, info, instrument, trace, warn};

/// Handle to a running dispatcher.
///
/// Dropping the handle shuts the dispatcher down.
///
/// # Example
///
/// ```rust,ignore
/// use pacer_rate_limit::{Dispatcher, DispatcherConfig};
///
/// let dispatcher = Dispatcher::spawn(&DispatcherConfig::new("key"), transport)?;
/// let handle = dispatcher.submit_authenticated("https://api.example.com/v2/status").await?;
/// let response = handle.await?;
/// println!("{}: {}", response.status(), response.body());
/// ```
#[derive(Debug)]
pub struct Dispatcher {
    queue: RequestQueue,
    gate: AdmissionGate,
    has_credential: bool,
    shut_down: AtomicBool,
    worker: JoinHandle<()>,
}

impl Dispatcher {
    /// Start the background worker.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration is invalid or if called
    /// outside a Tokio runtime.
    #[instrument(skip(config, transport), fields(
        min_delay_ms = *config.min_delay_between_requests_ms(),
        capacity = *config.buffer_capacity()
    ))]
    pub fn spawn(config: &DispatcherConfig, transport: Arc<dyn Transport>) -> PacerResult<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ConfigError::new(format!("Dispatcher requires a Tokio runtime: {}", e)))?;

        let gate = AdmissionGate::new();
        let (queue, receiver) = RequestQueue::bounded(*config.buffer_capacity());
        let scheduler = ResetScheduler::new(gate.clone(), config.reset_margin());
        let classifier =
            ResponseClassifier::new(gate.clone(), scheduler, config.header_defaults());
        let credential = config.credential();
        let has_credential = credential.is_some();

        let worker = Worker {
            receiver,
            queue: queue.clone(),
            gate: gate.clone(),
            classifier,
            transport,
            credential: credential.map(Arc::new),
            pacing: Pacing::new(config.min_delay()),
        };
        let worker = runtime.spawn(worker.run().instrument(debug_span!("dispatcher")));

        info!("Dispatcher started");
        Ok(Self {
            queue,
            gate,
            has_credential,
            shut_down: AtomicBool::new(false),
            worker,
        })
    }

    /// Queue an unauthenticated GET.
    ///
    /// Waits while the queue is full. The returned handle resolves to the
    /// response.
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` after shutdown.
    #[instrument(skip(self, target), fields(url = tracing::field::Empty))]
    pub async fn submit(&self, target: impl Into<String>) -> PacerResult<ResponseHandle> {
        self.enqueue(target.into(), false).await
    }

    /// Queue a GET carrying the configured credential.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if no API key is configured, and
    /// `QueueClosed` after shutdown.
    #[instrument(skip(self, target), fields(url = tracing::field::Empty))]
    pub async fn submit_authenticated(
        &self,
        target: impl Into<String>,
    ) -> PacerResult<ResponseHandle> {
        if !self.has_credential {
            Err(ConfigError::new(
                "Authenticated request submitted but no API key is configured",
            ))?
        }
        self.enqueue(target.into(), true).await
    }

    async fn enqueue(&self, target: String, authenticated: bool) -> PacerResult<ResponseHandle> {
        tracing::Span::current().record("url", target.as_str());
        if self.is_shut_down() {
            Err(DispatchError::new(DispatchErrorKind::QueueClosed))?
        }

        let (request, handle) = PendingRequest::new(target, authenticated);
        self.queue.submit(request).await?;
        Ok(handle)
    }

    /// Current window state.
    pub async fn snapshot(&self) -> WindowSnapshot {
        self.gate.snapshot().await
    }

    /// Stop the worker.
    ///
    /// Requests still queued are dropped and their handles resolve to a
    /// `Shutdown` error. Sends already in flight run to completion.
    pub fn shutdown(&self) {
        if !self.shut_down.swap(true, Ordering::AcqRel) {
            info!("Shutting down dispatcher");
            self.worker.abort();
        }
    }

    /// Whether [`Dispatcher::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Enforces the minimum spacing between consecutive send starts.
#[derive(Debug)]
struct Pacing {
    min_delay: Duration,
    last_send: Option<Instant>,
}

impl Pacing {
    fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_send: None,
        }
    }

    /// Wait until the minimum delay since the last send has passed.
    async fn ready(&self) {
        if let Some(last) = self.last_send {
            tokio::time::sleep_until(last + self.min_delay).await;
        }
    }

    fn record_send(&mut self) {
        self.last_send = Some(Instant::now());
    }
}

/// State owned by the background task.
struct Worker {
    receiver: mpsc::Receiver<PendingRequest>,
    queue: RequestQueue,
    gate: AdmissionGate,
    classifier: ResponseClassifier,
    transport: Arc<dyn Transport>,
    credential: Option<Arc<Credential>>,
    pacing: Pacing,
}

impl Worker {
    async fn run(mut self) {
        while let Some(request) = self.receiver.recv().await {
            if request.is_canceled() {
                debug!(url = %request.target(), "Dropping request canceled while queued");
                continue;
            }

            let window = self.gate.acquire().await;
            self.pacing.ready().await;

            if request.is_canceled() {
                debug!(url = %request.target(), "Request canceled while waiting, refunding permit");
                self.gate.release(1).await;
                continue;
            }

            self.pacing.record_send();
            self.send(request, window);
        }
    }

    /// Spawn the send task. `window` is the generation the permit came from.
    fn send(&self, request: PendingRequest, window: u64) {
        let transport = Arc::clone(&self.transport);
        let classifier = self.classifier.clone();
        let queue = self.queue.clone();
        let gate = self.gate.clone();
        let credential = if request.is_authenticated() {
            self.credential.clone()
        } else {
            None
        };
        let span = debug_span!("send", url = %request.target());

        tokio::spawn(
            async move {
                trace!("Sending request");
                let result = transport
                    .get(request.target(), credential.as_deref())
                    .await;
                let response = match result {
                    Ok(response) => response,
                    Err(e) => {
                        warn!(error = %e, "Transport failed");
                        gate.return_probe(window).await;
                        request.complete(Err(e));
                        return;
                    }
                };

                let outcome = classifier.classify(&response).await;
                if outcome.allow {
                    request.complete(Ok(response.into_api_response()));
                    return;
                }

                debug!("Re-queueing rejected request");
                if let Err(request) = queue.resubmit(request).await {
                    request.complete(Err(DispatchError::new(DispatchErrorKind::Shutdown).into()));
                }
            }
            .instrument(span),
        );
    }
}

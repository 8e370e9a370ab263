//! The high-level client.

use crate::ReqwestTransport;
use pacer_core::ApiResponse;
use pacer_error::PacerResult;
use pacer_interface::Transport;
use pacer_rate_limit::{Dispatcher, DispatcherConfig, ResponseHandle, WindowSnapshot};
use std::sync::Arc;
use tracing::instrument;

/// A rate-limited API client.
///
/// Wraps a [`Dispatcher`] with a transport. All requests made through one
/// client share a single quota window. Must be created inside a Tokio
/// runtime.
///
/// # Example
///
/// ```rust,ignore
/// use pacer::{DispatcherConfig, RateLimitedClient};
///
/// let client = RateLimitedClient::new(DispatcherConfig::new(api_key))?;
/// let response = client.get_authenticated("https://api.example.com/v2/status").await?;
/// println!("{}", response.body());
/// ```
#[derive(Debug)]
pub struct RateLimitedClient {
    dispatcher: Dispatcher,
}

impl RateLimitedClient {
    /// Create a client sending over HTTP with `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration is invalid or no Tokio
    /// runtime is running.
    #[instrument(skip(config))]
    pub fn new(config: DispatcherConfig) -> PacerResult<Self> {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client sending through a custom transport.
    ///
    /// # Errors
    ///
    /// Same as [`RateLimitedClient::new`].
    #[instrument(skip(config, transport))]
    pub fn with_transport(
        config: DispatcherConfig,
        transport: Arc<dyn Transport>,
    ) -> PacerResult<Self> {
        tracing::debug!(?config, "Creating rate-limited client");
        let dispatcher = Dispatcher::spawn(&config, transport)?;
        Ok(Self { dispatcher })
    }

    /// Create a client from [`DispatcherConfig::load`].
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails, plus the errors of
    /// [`RateLimitedClient::new`].
    pub fn from_env() -> PacerResult<Self> {
        Self::new(DispatcherConfig::load()?)
    }

    /// Queue an unauthenticated GET and return its handle.
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` after shutdown.
    pub async fn submit(&self, url: impl Into<String>) -> PacerResult<ResponseHandle> {
        self.dispatcher.submit(url).await
    }

    /// Queue an authenticated GET and return its handle.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if no API key is configured, and
    /// `QueueClosed` after shutdown.
    pub async fn submit_authenticated(
        &self,
        url: impl Into<String>,
    ) -> PacerResult<ResponseHandle> {
        self.dispatcher.submit_authenticated(url).await
    }

    /// Queue an unauthenticated GET and wait for the response.
    ///
    /// # Errors
    ///
    /// Returns the transport error if no response was obtained, or a
    /// dispatch error on shutdown.
    pub async fn get(&self, url: impl Into<String>) -> PacerResult<ApiResponse> {
        self.submit(url).await?.await
    }

    /// Queue an authenticated GET and wait for the response.
    ///
    /// # Errors
    ///
    /// Same as [`RateLimitedClient::get`] and
    /// [`RateLimitedClient::submit_authenticated`].
    pub async fn get_authenticated(&self, url: impl Into<String>) -> PacerResult<ApiResponse> {
        self.submit_authenticated(url).await?.await
    }

    /// Current window state.
    pub async fn snapshot(&self) -> WindowSnapshot {
        self.dispatcher.snapshot().await
    }

    /// Stop dispatching. Queued requests resolve to a `Shutdown` error.
    pub fn shutdown(&self) {
        self.dispatcher.shutdown();
    }

    /// Whether [`RateLimitedClient::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        self.dispatcher.is_shut_down()
    }
}

//! HTTP transport backed by `reqwest`.

use async_trait::async_trait;
use pacer_core::{Credential, TransportResponse};
use pacer_error::{HttpError, PacerResult};
use pacer_interface::Transport;
use tracing::instrument;

/// Performs GET requests with a shared `reqwest::Client`.
///
/// Every status code, 429 included, is returned as a response. Only
/// failures to obtain a response at all become errors.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport around an existing client.
    ///
    /// Use this to set timeouts, proxies or default headers.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, credential), fields(authenticated = credential.is_some()))]
    async fn get(
        &self,
        url: &str,
        credential: Option<&Credential>,
    ) -> PacerResult<TransportResponse> {
        let mut request = self.client.get(url);
        if let Some(credential) = credential {
            request = request.header(credential.header().as_str(), credential.value().as_str());
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Request failed: {}", e);
            HttpError::request(url, e)
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            HttpError::request(url, format!("unreadable body: {}", e))
        })?;

        tracing::debug!(status, bytes = body.len(), "Response received");
        Ok(TransportResponse::new(status, headers, body))
    }
}

//! Transport abstraction.

use async_trait::async_trait;
use pacer_core::{Credential, TransportResponse};
use pacer_error::PacerResult;

/// Performs a single GET against the remote API.
///
/// Implementations must not retry, interpret status codes, or pace requests;
/// all of that belongs to the dispatcher. Any status the server returns,
/// including 429, is an `Ok` response. `Err` is reserved for failures where
/// no response was obtained (connection refused, unreadable body).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a GET to `url`, attaching `credential` when present.
    async fn get(
        &self,
        url: &str,
        credential: Option<&Credential>,
    ) -> PacerResult<TransportResponse>;
}

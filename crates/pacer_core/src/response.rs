//! Response types.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

/// Status code the server uses to signal an exhausted quota.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Raw response produced by a transport.
///
/// Header lookups are case-insensitive.
#[derive(Debug, Clone, derive_new::new, derive_getters::Getters)]
pub struct TransportResponse {
    /// HTTP status code.
    status: u16,
    /// Response headers.
    headers: HeaderMap,
    /// Response body.
    body: String,
}

impl TransportResponse {
    /// Whether the server rejected the request for exceeding its quota.
    pub fn is_over_quota(&self) -> bool {
        self.status == TOO_MANY_REQUESTS
    }

    /// Convert into the caller-facing response, dropping the headers.
    pub fn into_api_response(self) -> ApiResponse {
        ApiResponse {
            status: self.status,
            body: self.body,
        }
    }
}

/// Response delivered to callers: status code and body.
///
/// Statuses other than 429 are passed through uninterpreted, so a 404 or a
/// 500 arrives here as a successful delivery.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_new::new,
    derive_getters::Getters,
)]
#[display("{} ({} bytes)", status, body.len())]
pub struct ApiResponse {
    /// HTTP status code.
    status: u16,
    /// Response body.
    body: String,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

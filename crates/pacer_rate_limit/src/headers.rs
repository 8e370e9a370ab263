//! Rate limit metadata carried by response headers.
//!
//! The server reports two values on every response:
//! - `ratelimit-remaining`: requests left in the current window
//! - `ratelimit-reset`: seconds until the window resets
//!
//! Header names are matched case-insensitively. Missing or unparsable
//! values fall back to [`HeaderDefaults`], and the reset is never shorter
//! than one second.

use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::trace;

/// Header carrying the number of requests left in the window.
pub const RATELIMIT_REMAINING: &str = "ratelimit-remaining";

/// Header carrying the seconds until the window resets.
pub const RATELIMIT_RESET: &str = "ratelimit-reset";

/// Values assumed when the server omits rate limit headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderDefaults {
    /// Window quota assumed when `ratelimit-remaining` is unusable.
    pub remaining: u32,
    /// Reset delay assumed when `ratelimit-reset` is unusable.
    pub reset_secs: u64,
}

impl Default for HeaderDefaults {
    fn default() -> Self {
        Self {
            remaining: 110,
            reset_secs: 10,
        }
    }
}

/// Parsed rate limit headers of a single response.
///
/// # Example
///
/// ```
/// use pacer_rate_limit::{HeaderDefaults, RateLimitHeaders};
/// use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
///
/// let mut headers = HeaderMap::new();
/// let name = HeaderName::from_bytes(b"RateLimit-Remaining").unwrap();
/// headers.insert(name, HeaderValue::from_static("42"));
///
/// let parsed = RateLimitHeaders::from_headers(&headers, HeaderDefaults::default());
/// assert_eq!(parsed.remaining, 42);
/// assert_eq!(parsed.reset_secs, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RateLimitHeaders {
    /// Requests left in the current window.
    pub remaining: u32,
    /// Seconds until the window resets, at least 1.
    pub reset_secs: u64,
}

impl RateLimitHeaders {
    /// Read both headers, applying `defaults` where needed.
    pub fn from_headers(headers: &HeaderMap, defaults: HeaderDefaults) -> Self {
        let remaining = parse_header_i64(headers, RATELIMIT_REMAINING)
            .map(|value| value.clamp(0, i64::from(u32::MAX)) as u32)
            .unwrap_or(defaults.remaining);
        let reset_secs = reset_secs(headers, defaults);
        trace!(remaining, reset_secs, "Parsed rate limit headers");
        Self {
            remaining,
            reset_secs,
        }
    }

    /// Time until the window resets.
    pub fn reset(&self) -> Duration {
        Duration::from_secs(self.reset_secs)
    }
}

/// Read only `ratelimit-reset`, applying the default and the 1 second floor.
pub fn reset_secs(headers: &HeaderMap, defaults: HeaderDefaults) -> u64 {
    parse_header_i64(headers, RATELIMIT_RESET)
        .map(|value| value.max(1) as u64)
        .unwrap_or(defaults.reset_secs)
        .max(1)
}

/// Helper to parse a signed integer from header value.
///
/// Negative values are valid integers and get clamped by the callers.
fn parse_header_i64(headers: &HeaderMap, key: &str) -> Option<i64> {
    headers.get(key)?.to_str().ok()?.trim().parse().ok()
}

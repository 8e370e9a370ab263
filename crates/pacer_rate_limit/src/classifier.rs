//! Response classification and window calibration.
//!
//! Every response passes through [`ResponseClassifier::classify`] before it
//! reaches the caller. Three cases:
//!
//! - **429**: the first one in a window closes the window and schedules its
//!   reset. The request is re-queued by the caller of `classify`.
//! - **First other response of a window**: the probe permit has been spent
//!   to learn the quota. Its `ratelimit-remaining` becomes the permit count
//!   and its `ratelimit-reset` schedules the reset.
//! - **Any later response**: passed through untouched.

use crate::{AdmissionGate, HeaderDefaults, RateLimitHeaders, ResetScheduler, headers};
use pacer_core::TransportResponse;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// What to do with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResponseOutcome {
    /// `true` to deliver to the caller, `false` to re-queue the request.
    pub allow: bool,
    /// Status code of the response.
    pub status: u16,
}

/// Decides whether responses are delivered or retried, and keeps the gate
/// in sync with the server's window.
#[derive(Debug, Clone)]
pub struct ResponseClassifier {
    gate: AdmissionGate,
    scheduler: ResetScheduler,
    defaults: HeaderDefaults,
}

impl ResponseClassifier {
    /// Create a classifier calibrating `gate` and scheduling resets through
    /// `scheduler`.
    pub fn new(gate: AdmissionGate, scheduler: ResetScheduler, defaults: HeaderDefaults) -> Self {
        Self {
            gate,
            scheduler,
            defaults,
        }
    }

    /// Classify a response, updating the window as a side effect.
    #[instrument(skip(self, response), fields(status = *response.status()))]
    pub async fn classify(&self, response: &TransportResponse) -> ResponseOutcome {
        let status = *response.status();

        if response.is_over_quota() {
            let reset = headers::reset_secs(response.headers(), self.defaults);
            if self.gate.start_overflow_clock().await {
                warn!(reset_secs = reset, "Server rejected request, quota exceeded");
                self.scheduler.schedule(Duration::from_secs(reset));
            } else {
                debug!("Quota exceeded, reset already scheduled for this window");
            }
            return ResponseOutcome {
                allow: false,
                status,
            };
        }

        let limits = RateLimitHeaders::from_headers(response.headers(), self.defaults);
        if self.gate.calibrate(limits.remaining).await {
            debug!(
                remaining = limits.remaining,
                reset_secs = limits.reset_secs,
                "First response of window, quota learned"
            );
            self.scheduler.schedule(limits.reset());
        }

        ResponseOutcome {
            allow: true,
            status,
        }
    }
}

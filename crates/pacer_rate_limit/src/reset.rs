//! One-shot timers that return the gate to probe state.

use crate::AdmissionGate;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, debug_span};

/// Schedules window resets.
///
/// Every reset fires `reset + margin` after it is scheduled, where the
/// margin absorbs clock skew between client and server. The timers are
/// fire-and-forget; the window flags on the gate make sure at most one
/// calibration reset and one overflow reset are scheduled per window.
#[derive(Debug, Clone)]
pub struct ResetScheduler {
    gate: AdmissionGate,
    margin: Duration,
}

impl ResetScheduler {
    /// Create a scheduler resetting `gate`.
    pub fn new(gate: AdmissionGate, margin: Duration) -> Self {
        Self { gate, margin }
    }

    /// Restore probe state once `reset` plus the margin has elapsed.
    pub fn schedule(&self, reset: Duration) -> JoinHandle<()> {
        let delay = reset + self.margin;
        debug!(delay_ms = delay.as_millis() as u64, "Scheduling window reset");

        let gate = self.gate.clone();
        tokio::spawn(
            async move {
                tokio::time::sleep(delay).await;
                gate.restore_probe().await;
            }
            .instrument(debug_span!("window_reset")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_reset_fires_after_margin() {
        let gate = AdmissionGate::new();
        gate.acquire().await;
        gate.calibrate(0).await;

        let scheduler = ResetScheduler::new(gate.clone(), Duration::from_secs(2));
        let timer = scheduler.schedule(Duration::from_secs(3));

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(gate.snapshot().await.remaining, 0);
        assert!(gate.snapshot().await.first_response_seen);

        timer.await.unwrap();
        let snapshot = gate.snapshot().await;
        assert_eq!(snapshot.remaining, 1);
        assert!(!snapshot.first_response_seen);
    }
}

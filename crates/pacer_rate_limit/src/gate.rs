//! Admission gate: permits left in the current window.
//!
//! The permit counter and the two "first responder" flags of a window are
//! one unit of state behind one lock. Every read-modify-write (acquire,
//! refund, calibrate, overflow, reset) happens under that lock, so a waiter
//! can never observe a calibrated counter without the matching flag.
//!
//! Waiters park on a [`Notify`] and are all woken whenever permits are
//! added. A woken waiter re-checks the counter before taking a permit.

use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, trace};

/// Point-in-time view of the window state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowSnapshot {
    /// Permits left in the current window.
    pub remaining: u32,
    /// Whether a response has already calibrated this window.
    pub first_response_seen: bool,
    /// Whether a 429 has already scheduled this window's reset.
    pub overflow_clock_started: bool,
    /// Number of resets since the gate was created.
    pub generation: u64,
}

#[derive(Debug)]
struct WindowState {
    remaining: u32,
    first_response_seen: bool,
    overflow_clock_started: bool,
    generation: u64,
}

impl WindowState {
    /// A single probe permit, used to learn the real quota.
    fn probe(generation: u64) -> Self {
        Self {
            remaining: 1,
            first_response_seen: false,
            overflow_clock_started: false,
            generation,
        }
    }
}

#[derive(Debug)]
struct GateInner {
    state: Mutex<WindowState>,
    waiters: Notify,
}

/// Shared permit counter with blocking acquire.
///
/// Cloning is cheap; clones share the same window.
///
/// # Example
///
/// ```
/// use pacer_rate_limit::AdmissionGate;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gate = AdmissionGate::new();
///
/// // The probe permit is available right away.
/// let window = gate.acquire().await;
/// assert_eq!(window, 0);
/// assert_eq!(gate.snapshot().await.remaining, 0);
///
/// gate.release(1).await;
/// assert_eq!(gate.snapshot().await.remaining, 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    inner: Arc<GateInner>,
}

impl AdmissionGate {
    /// Create a gate in probe state: one permit, no flags set.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GateInner {
                state: Mutex::new(WindowState::probe(0)),
                waiters: Notify::new(),
            }),
        }
    }

    /// Wait until a permit is available, then take it.
    ///
    /// Returns the generation of the window the permit was taken from.
    pub async fn acquire(&self) -> u64 {
        loop {
            let notified = self.inner.waiters.notified();
            tokio::pin!(notified);
            // Register before checking so a release between the check and
            // the await still wakes us.
            notified.as_mut().enable();

            {
                let mut state = self.inner.state.lock().await;
                if state.remaining > 0 {
                    state.remaining -= 1;
                    trace!(remaining = state.remaining, "Permit acquired");
                    return state.generation;
                }
            }

            trace!("Window exhausted, waiting for permits");
            notified.await;
        }
    }

    /// Return `n` permits and wake all waiters.
    pub async fn release(&self, n: u32) {
        let mut state = self.inner.state.lock().await;
        state.remaining = state.remaining.saturating_add(n);
        trace!(released = n, remaining = state.remaining, "Permits released");
        self.inner.waiters.notify_waiters();
    }

    /// Set the window quota from the first non-429 response of the window.
    ///
    /// Returns `true` if this call performed the calibration, `false` if
    /// another response already did. The caller that gets `true` owns the
    /// window's reset.
    pub async fn calibrate(&self, remaining: u32) -> bool {
        let mut state = self.inner.state.lock().await;
        if state.first_response_seen {
            return false;
        }
        state.first_response_seen = true;
        state.remaining = remaining;
        debug!(remaining, "Window calibrated from response headers");
        self.inner.waiters.notify_waiters();
        true
    }

    /// Close the window after the server reported an exhausted quota.
    ///
    /// Returns `true` for the first 429 of the window, which also drains the
    /// counter to zero. Later calls in the same window change nothing.
    pub async fn start_overflow_clock(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        if state.overflow_clock_started {
            return false;
        }
        state.overflow_clock_started = true;
        state.remaining = 0;
        debug!("Quota exceeded, window closed until reset");
        true
    }

    /// Give back the probe permit after a send that produced no response.
    ///
    /// `generation` is what [`AdmissionGate::acquire`] returned for the
    /// failed send. The permit is returned only if it was the probe of the
    /// current window: same generation, and no response has calibrated the
    /// window and no 429 has closed it. A failure from an earlier window
    /// changes nothing. Returns `true` if the permit was returned.
    pub async fn return_probe(&self, generation: u64) -> bool {
        let mut state = self.inner.state.lock().await;
        if state.generation != generation
            || state.first_response_seen
            || state.overflow_clock_started
        {
            return false;
        }
        state.remaining = state.remaining.saturating_add(1);
        debug!("Probe produced no response, permit returned");
        self.inner.waiters.notify_waiters();
        true
    }

    /// Start a new window in probe state: clear both flags, one permit,
    /// wake all waiters.
    pub async fn restore_probe(&self) {
        let mut state = self.inner.state.lock().await;
        *state = WindowState::probe(state.generation.wrapping_add(1));
        debug!(generation = state.generation, "Window reset to probe state");
        self.inner.waiters.notify_waiters();
    }

    /// Current window state.
    pub async fn snapshot(&self) -> WindowSnapshot {
        let state = self.inner.state.lock().await;
        WindowSnapshot {
            remaining: state.remaining,
            first_response_seen: state.first_response_seen,
            overflow_clock_started: state.overflow_clock_started,
            generation: state.generation,
        }
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_starts_with_probe_permit() {
        let gate = AdmissionGate::new();
        let snapshot = gate.snapshot().await;
        assert_eq!(snapshot.remaining, 1);
        assert!(!snapshot.first_response_seen);
        assert!(!snapshot.overflow_clock_started);
        assert_eq!(snapshot.generation, 0);

        assert_eq!(gate.acquire().await, 0);
        assert_eq!(gate.snapshot().await.remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_release() {
        let gate = AdmissionGate::new();
        gate.acquire().await;

        let blocked = timeout(Duration::from_secs(5), gate.acquire()).await;
        assert!(blocked.is_err(), "acquire should wait on an empty window");

        let waiter = tokio::spawn({
            let gate = gate.clone();
            async move { gate.acquire().await }
        });
        tokio::task::yield_now().await;
        gate.release(1).await;

        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake after release")
            .unwrap();
        assert_eq!(gate.snapshot().await.remaining, 0);
    }

    #[tokio::test]
    async fn test_release_wakes_every_waiter() {
        let gate = AdmissionGate::new();
        gate.acquire().await;

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let gate = gate.clone();
                tokio::spawn(async move { gate.acquire().await })
            })
            .collect();
        tokio::task::yield_now().await;

        gate.release(3).await;
        for waiter in waiters {
            timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        }
        assert_eq!(gate.snapshot().await.remaining, 0);
    }

    #[tokio::test]
    async fn test_only_first_calibration_applies() {
        let gate = AdmissionGate::new();
        gate.acquire().await;

        assert!(gate.calibrate(42).await);
        assert!(!gate.calibrate(7).await);

        let snapshot = gate.snapshot().await;
        assert_eq!(snapshot.remaining, 42);
        assert!(snapshot.first_response_seen);
    }

    #[tokio::test]
    async fn test_only_first_overflow_drains_window() {
        let gate = AdmissionGate::new();
        gate.calibrate(10).await;

        assert!(gate.start_overflow_clock().await);
        assert_eq!(gate.snapshot().await.remaining, 0);

        gate.release(1).await;
        assert!(!gate.start_overflow_clock().await);
        assert_eq!(gate.snapshot().await.remaining, 1);
    }

    #[tokio::test]
    async fn test_return_probe_only_before_window_is_learned() {
        let gate = AdmissionGate::new();
        let window = gate.acquire().await;
        assert!(gate.return_probe(window).await);
        assert_eq!(gate.snapshot().await.remaining, 1);

        let window = gate.acquire().await;
        gate.calibrate(0).await;
        assert!(!gate.return_probe(window).await);
        assert_eq!(gate.snapshot().await.remaining, 0);
    }

    #[tokio::test]
    async fn test_return_probe_ignores_earlier_window() {
        let gate = AdmissionGate::new();
        gate.calibrate(5).await;
        let stale = gate.acquire().await;

        // The window resets while the send is still in flight, and the new
        // window's probe goes out.
        gate.restore_probe().await;
        let current = gate.acquire().await;
        assert_ne!(stale, current);

        // The old send fails: it must not hand out a second probe permit.
        assert!(!gate.return_probe(stale).await);
        assert_eq!(gate.snapshot().await.remaining, 0);

        assert!(gate.return_probe(current).await);
        assert_eq!(gate.snapshot().await.remaining, 1);
    }

    #[tokio::test]
    async fn test_restore_probe_clears_flags() {
        let gate = AdmissionGate::new();
        gate.calibrate(5).await;
        gate.start_overflow_clock().await;

        gate.restore_probe().await;
        let snapshot = gate.snapshot().await;
        assert_eq!(snapshot.remaining, 1);
        assert!(!snapshot.first_response_seen);
        assert!(!snapshot.overflow_clock_started);
        assert_eq!(snapshot.generation, 1);

        assert!(gate.calibrate(3).await);
        assert!(gate.start_overflow_clock().await);
    }
}

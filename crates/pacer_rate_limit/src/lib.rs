//! Quota-learning request dispatcher.
//!
//! This crate paces GET requests to a remote API so that a server-imposed
//! per-window quota is never exceeded, while using as much of it as possible.
//! The quota is not configured: it is learned from the headers of the first
//! response of every window.
//!
//! ## How a window works
//!
//! - The gate starts with a single *probe* permit. The first request spends
//!   it, and its response's `ratelimit-remaining` header becomes the permit
//!   count for the rest of the window.
//! - The same response's `ratelimit-reset` header (plus a 2 second margin)
//!   schedules the reset, which puts the gate back into probe state.
//! - A 429 response closes the window early and schedules its own reset.
//!   The rejected request goes back to the end of the queue, invisibly to
//!   the caller.
//!
//! ## Components
//!
//! - [`AdmissionGate`] - permit counter plus window flags
//! - [`RequestQueue`] - bounded FIFO with backpressure
//! - [`Dispatcher`] - single worker draining the queue
//! - [`ResponseClassifier`] - delivers, re-queues, or calibrates
//! - [`ResetScheduler`] - one-shot window resets
//! - [`PendingRequest`] / [`ResponseHandle`] - a request and its future

mod classifier;
mod config;
mod dispatcher;
mod gate;
mod headers;
mod queue;
mod request;
mod reset;

pub use classifier::{ResponseClassifier, ResponseOutcome};
pub use config::{DispatcherConfig, DispatcherConfigBuilder};
pub use dispatcher::Dispatcher;
pub use gate::{AdmissionGate, WindowSnapshot};
pub use headers::{HeaderDefaults, RATELIMIT_REMAINING, RATELIMIT_RESET, RateLimitHeaders};
pub use queue::RequestQueue;
pub use request::{CancelToken, PendingRequest, ResponseHandle};
pub use reset::ResetScheduler;

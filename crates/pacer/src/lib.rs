//! Pacer - a rate-limited API client that learns its quota.
//!
//! Pacer sends GET requests to an API that enforces a per-window request
//! quota and reports it through `ratelimit-remaining` and `ratelimit-reset`
//! headers. Instead of configuring the quota, the client probes it with one
//! request per window and admits exactly as many requests as the server
//! allows. Rejected (429) requests are retried transparently.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pacer::{DispatcherConfig, RateLimitedClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let _telemetry = pacer::init_telemetry()?;
//!     let client = RateLimitedClient::new(DispatcherConfig::new(std::env::var("API_KEY")?))?;
//!
//!     let handles = vec![
//!         client.submit_authenticated("https://api.example.com/v2/a").await?,
//!         client.submit_authenticated("https://api.example.com/v2/b").await?,
//!     ];
//!     for handle in handles {
//!         let response = handle.await?;
//!         println!("{}", response);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `observability` - export spans through OpenTelemetry to stdout
//!
//! # Architecture
//!
//! - `pacer_error` - error types
//! - `pacer_core` - credential and response types
//! - `pacer_interface` - the `Transport` trait
//! - `pacer_rate_limit` - gate, queue, dispatcher, configuration
//!
//! This crate re-exports everything for convenience and adds the `reqwest`
//! transport.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod telemetry;
mod transport;

pub use client::RateLimitedClient;
pub use telemetry::{TelemetryGuard, init_telemetry};
pub use transport::ReqwestTransport;

pub use pacer_core::*;
pub use pacer_error::*;
pub use pacer_interface::*;
pub use pacer_rate_limit::*;

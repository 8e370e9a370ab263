//! Core data types for the Pacer workspace.
//!
//! This crate provides the values exchanged between callers, the dispatcher
//! and the transport.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod credential;
mod response;

pub use credential::Credential;
pub use response::{ApiResponse, TransportResponse, TOO_MANY_REQUESTS};

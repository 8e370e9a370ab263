//! Error types for the Pacer workspace.
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use pacer_error::{HttpError, PacerResult};
//!
//! fn fetch() -> PacerResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! assert!(fetch().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dispatch;
mod error;
mod http;

pub use config::ConfigError;
pub use dispatch::{DispatchError, DispatchErrorKind};
pub use error::{PacerError, PacerErrorKind, PacerResult};
pub use http::HttpError;

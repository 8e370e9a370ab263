//! Trait definitions for the Pacer workspace.
//!
//! The dispatcher never talks to the network directly. It hands every
//! admitted request to a [`Transport`], which makes exactly one attempt and
//! reports what the server said.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::Transport;

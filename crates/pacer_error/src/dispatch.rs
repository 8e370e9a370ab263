//! Errors surfaced by the request dispatcher.

/// Dispatcher error conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum DispatchErrorKind {
    /// The caller canceled the request
    #[display("Request was canceled")]
    Canceled,
    /// The dispatcher stopped before the request completed
    #[display("Dispatcher shut down before the request completed")]
    Shutdown,
    /// The request queue no longer accepts submissions
    #[display("Request queue is closed")]
    QueueClosed,
}

/// Dispatcher error with location tracking.
///
/// # Examples
///
/// ```
/// use pacer_error::{DispatchError, DispatchErrorKind};
///
/// let err = DispatchError::new(DispatchErrorKind::Canceled);
/// assert_eq!(err.kind(), DispatchErrorKind::Canceled);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Dispatch Error: {} at line {} in {}", kind, line, file)]
pub struct DispatchError {
    kind: DispatchErrorKind,
    line: u32,
    file: &'static str,
}

impl DispatchError {
    /// Create a new dispatch error with caller location tracking.
    #[track_caller]
    pub fn new(kind: DispatchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> DispatchErrorKind {
        self.kind
    }
}

impl From<DispatchErrorKind> for DispatchError {
    #[track_caller]
    fn from(kind: DispatchErrorKind) -> Self {
        Self::new(kind)
    }
}

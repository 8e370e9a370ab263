//! Top-level error wrapper types.

use crate::{ConfigError, DispatchError, HttpError};

/// Every error condition a Pacer operation can produce.
///
/// # Examples
///
/// ```
/// use pacer_error::{HttpError, PacerError};
///
/// let err: PacerError = HttpError::new("Connection failed").into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum PacerErrorKind {
    /// Transport failure
    #[from(HttpError)]
    Http(HttpError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Dispatcher error (cancellation, shutdown)
    #[from(DispatchError)]
    Dispatch(DispatchError),
}

/// Pacer error with kind discrimination.
///
/// # Examples
///
/// ```
/// use pacer_error::{ConfigError, PacerResult};
///
/// fn might_fail() -> PacerResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Pacer Error: {}", _0)]
pub struct PacerError(Box<PacerErrorKind>);

impl PacerError {
    /// Create a new error from a kind.
    pub fn new(kind: PacerErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PacerErrorKind {
        &self.0
    }

    /// Whether the error reports a caller-initiated cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(
            self.kind(),
            PacerErrorKind::Dispatch(e) if e.kind() == crate::DispatchErrorKind::Canceled
        )
    }
}

// Generic From implementation for any type that converts to PacerErrorKind
impl<T> From<T> for PacerError
where
    T: Into<PacerErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Pacer operations.
pub type PacerResult<T> = std::result::Result<T, PacerError>;

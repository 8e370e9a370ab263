//! HTTP error types.

/// Transport failure with source location.
///
/// Raised for connection errors, unreadable bodies and malformed requests.
/// These are never retried by the dispatcher; they reach the caller as-is.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} at line {} in {}", message, line, file)]
pub struct HttpError {
    /// The underlying error message
    pub message: String,
    /// URL of the request that failed, if known
    pub url: Option<String>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Create a new HttpError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use pacer_error::HttpError;
    ///
    /// let err = HttpError::new("Connection refused");
    /// assert!(err.message.contains("Connection refused"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            url: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create an error for a GET to `url` that produced no response.
    ///
    /// # Examples
    ///
    /// ```
    /// use pacer_error::HttpError;
    ///
    /// let err = HttpError::request("https://api.example.com/v2/a", "connection reset");
    /// assert_eq!(err.url.as_deref(), Some("https://api.example.com/v2/a"));
    /// assert!(err.message.contains("GET https://api.example.com/v2/a failed"));
    /// ```
    #[track_caller]
    pub fn request(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        let url = url.into();
        let location = std::panic::Location::caller();
        Self {
            message: format!("GET {} failed: {}", url, reason),
            url: Some(url),
            line: location.line(),
            file: location.file(),
        }
    }
}

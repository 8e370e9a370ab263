//! Configuration error types.

/// Configuration error with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Configuration file involved, if any
    pub path: Option<String>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use pacer_error::ConfigError;
    ///
    /// let err = ConfigError::new("buffer_capacity must be at least 1");
    /// assert!(err.message.contains("buffer_capacity"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            path: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create an error for a configuration file that could not be used.
    ///
    /// # Examples
    ///
    /// ```
    /// use pacer_error::ConfigError;
    ///
    /// let err = ConfigError::in_file("/etc/pacer.toml", "missing field");
    /// assert_eq!(err.path.as_deref(), Some("/etc/pacer.toml"));
    /// assert!(err.message.starts_with("/etc/pacer.toml: "));
    /// ```
    #[track_caller]
    pub fn in_file(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        let path = path.into();
        let location = std::panic::Location::caller();
        Self {
            message: format!("{}: {}", path, reason),
            path: Some(path),
            line: location.line(),
            file: location.file(),
        }
    }
}

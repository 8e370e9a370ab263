//! Dispatcher configuration.
//!
//! Configuration can be built in code, or loaded with precedence:
//! - Bundled defaults (include_str! from pacer.toml)
//! - User overrides (~/.config/pacer/pacer.toml, then ./pacer.toml)
//! - `PACER_DISPATCHER__*` environment variables

use crate::HeaderDefaults;
use config::{Config, Environment, File, FileFormat};
use pacer_core::Credential;
use pacer_error::{ConfigError, PacerResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Settings for one dispatcher instance.
///
/// # Example
///
/// ```
/// use pacer_rate_limit::DispatcherConfig;
///
/// let config = DispatcherConfig::new("my-key")
///     .with_min_delay_between_requests_ms(20)
///     .with_buffer_capacity(64);
///
/// assert_eq!(*config.buffer_capacity(), 64);
/// assert_eq!(config.min_delay().as_millis(), 20);
/// ```
#[derive(
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(build_fn(private, name = "build_internal"))]
pub struct DispatcherConfig {
    /// Minimum time between the start of two consecutive sends (milliseconds)
    #[serde(default = "default_min_delay_ms")]
    #[builder(default = "default_min_delay_ms()")]
    min_delay_between_requests_ms: u64,

    /// Number of requests the queue holds before submitters wait
    #[serde(default = "default_buffer_capacity")]
    #[builder(default = "default_buffer_capacity()")]
    buffer_capacity: usize,

    /// Key attached to authenticated requests
    #[serde(default)]
    #[setters(skip)]
    #[builder(default, setter(into, strip_option))]
    api_key: Option<String>,

    /// Header the key is sent under
    #[serde(default = "default_api_key_header")]
    #[builder(default = "default_api_key_header()", setter(into))]
    api_key_header: String,

    /// Seconds added to every server-reported reset to absorb clock skew
    #[serde(default = "default_reset_margin_secs")]
    #[builder(default = "default_reset_margin_secs()")]
    reset_margin_secs: u64,

    /// Reset delay assumed when `ratelimit-reset` is missing or invalid
    #[serde(default = "default_reset_secs")]
    #[builder(default = "default_reset_secs()")]
    default_reset_secs: u64,

    /// Window quota assumed when `ratelimit-remaining` is missing or invalid
    #[serde(default = "default_remaining")]
    #[builder(default = "default_remaining()")]
    default_remaining: u32,
}

fn default_min_delay_ms() -> u64 {
    8
}

fn default_buffer_capacity() -> usize {
    500
}

fn default_api_key_header() -> String {
    "API-Key".to_string()
}

fn default_reset_margin_secs() -> u64 {
    2
}

fn default_reset_secs() -> u64 {
    10
}

fn default_remaining() -> u32 {
    110
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            min_delay_between_requests_ms: default_min_delay_ms(),
            buffer_capacity: default_buffer_capacity(),
            api_key: None,
            api_key_header: default_api_key_header(),
            reset_margin_secs: default_reset_margin_secs(),
            default_reset_secs: default_reset_secs(),
            default_remaining: default_remaining(),
        }
    }
}

impl std::fmt::Debug for DispatcherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherConfig")
            .field(
                "min_delay_between_requests_ms",
                &self.min_delay_between_requests_ms,
            )
            .field("buffer_capacity", &self.buffer_capacity)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_header", &self.api_key_header)
            .field("reset_margin_secs", &self.reset_margin_secs)
            .field("default_reset_secs", &self.default_reset_secs)
            .field("default_remaining", &self.default_remaining)
            .finish()
    }
}

impl DispatcherConfigBuilder {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a field fails validation.
    pub fn build(&self) -> PacerResult<DispatcherConfig> {
        let config = self
            .build_internal()
            .map_err(|e| ConfigError::new(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// File layout: dispatcher settings live under a `[dispatcher]` table.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    dispatcher: DispatcherConfig,
}

impl DispatcherConfig {
    /// Default settings with a key for authenticated requests.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Attach a key for authenticated requests.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the minimum spacing between consecutive sends.
    ///
    /// Sub-millisecond precision is truncated.
    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay_between_requests_ms = delay.as_millis() as u64;
        self
    }

    /// Minimum spacing between consecutive sends.
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_between_requests_ms)
    }

    /// Margin added to server-reported reset delays.
    pub fn reset_margin(&self) -> Duration {
        Duration::from_secs(self.reset_margin_secs)
    }

    /// Fallbacks used when rate limit headers are absent.
    pub fn header_defaults(&self) -> HeaderDefaults {
        HeaderDefaults {
            remaining: self.default_remaining,
            reset_secs: self.default_reset_secs,
        }
    }

    /// The credential for authenticated requests, if a key is configured.
    pub fn credential(&self) -> Option<Credential> {
        self.api_key
            .as_ref()
            .map(|key| Credential::new(self.api_key_header.clone(), key.clone()))
    }

    /// Check field invariants.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the buffer capacity is zero or the key
    /// header is empty.
    pub fn validate(&self) -> PacerResult<()> {
        if self.buffer_capacity == 0 {
            Err(ConfigError::new("buffer_capacity must be at least 1"))?
        }
        if self.api_key_header.trim().is_empty() {
            Err(ConfigError::new("api_key_header must not be empty"))?
        }
        Ok(())
    }

    /// Load configuration from a specific file path.
    ///
    /// The file must contain a `[dispatcher]` table; missing fields take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> PacerResult<Self> {
        debug!("Loading dispatcher configuration from file");

        let display = path.as_ref().display().to_string();
        let file: ConfigFile = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| ConfigError::in_file(display.clone(), e))?
            .try_deserialize()
            .map_err(|e| ConfigError::in_file(display.clone(), e))?;

        file.dispatcher.validate()?;
        Ok(file.dispatcher)
    }

    /// Load configuration with precedence: environment > current dir > home dir > bundled.
    ///
    /// User config files are optional and silently skipped if not found.
    /// Environment variables use the `PACER` prefix and `__` as separator,
    /// e.g. `PACER_DISPATCHER__BUFFER_CAPACITY=100`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pacer_rate_limit::DispatcherConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = DispatcherConfig::load()?;
    /// println!("capacity: {}", config.buffer_capacity());
    /// # Ok(())
    /// # }
    /// ```
    #[instrument]
    pub fn load() -> PacerResult<Self> {
        debug!("Loading configuration: env > current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../pacer.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/pacer/pacer.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("pacer").required(false))
            .add_source(
                Environment::with_prefix("PACER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let file: ConfigFile = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        file.dispatcher.validate()?;
        Ok(file.dispatcher)
    }
}

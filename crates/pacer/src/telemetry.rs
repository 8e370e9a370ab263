//! Tracing subscriber setup.
//!
//! Log output honors `RUST_LOG`. With the `observability` feature, spans are
//! also exported through OpenTelemetry to stdout.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "observability")]
use opentelemetry::trace::TracerProvider as _;
#[cfg(feature = "observability")]
use opentelemetry_sdk::trace::SdkTracerProvider;

/// Keeps telemetry alive. Dropping it flushes and shuts down exporters.
#[derive(Debug, Default)]
#[must_use = "dropping the guard shuts telemetry down"]
pub struct TelemetryGuard {
    #[cfg(feature = "observability")]
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        #[cfg(feature = "observability")]
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                tracing::warn!("Failed to shut down tracer provider: {}", e);
            }
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,pacer=debug"))
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
#[cfg(not(feature = "observability"))]
pub fn init_telemetry() -> Result<TelemetryGuard, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .try_init()?;

    tracing::info!("Telemetry initialized");
    Ok(TelemetryGuard::default())
}

/// Install the global tracing subscriber with OpenTelemetry span export.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
#[cfg(feature = "observability")]
pub fn init_telemetry() -> Result<TelemetryGuard, Box<dyn std::error::Error>> {
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
        .build();
    let tracer = provider.tracer("pacer");

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()?;

    tracing::info!("Telemetry initialized with OpenTelemetry stdout exporter");
    Ok(TelemetryGuard {
        provider: Some(provider),
    })
}

//! Structured telemetry initialisation for the host.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use pain_editor_config::{Config, LogFormat};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Filter directive silencing the file watcher's event-loop dependency.
///
/// The directive is appended to the configured filter exactly once, at
/// subscriber install time, and there is no uninstall. Its effect is purely
/// cosmetic: it filters output without altering behaviour.
const NOISE_FILTER_DIRECTIVE: &str = "mio=off";

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter expression failed to parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Installing the tracing subscriber failed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Repeated calls are idempotent: the first invocation installs the global
/// subscriber and every later one returns a fresh [`TelemetryHandle`]
/// without touching global state again.
///
/// # Errors
///
/// Returns a [`TelemetryError`] when the filter expression is invalid or the
/// subscriber cannot be installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|()| TelemetryHandle)
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(noise_filtered(config.log_filter()))
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_writer(io::stderr)
            // Avoid stray colour codes in non-TTY sinks while keeping colour
            // on interactive terminals.
            .with_ansi(io::stderr().is_terminal())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => {
            let json = builder(filter).json().flatten_event(true).finish();
            Box::new(json)
        }
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

/// Appends the noise directive unless the user already filters the target.
fn noise_filtered(filter: &str) -> String {
    let already_scoped = filter
        .split(',')
        .any(|directive| directive.trim_start().starts_with("mio"));
    if already_scoped {
        filter.to_owned()
    } else {
        format!("{filter},{NOISE_FILTER_DIRECTIVE}")
    }
}

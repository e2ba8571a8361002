//! Installs the process-wide `tracing` subscriber.
//!
//! Events go to stderr so that stdout carries only the local output sink's
//! `Sending:` and `Result:` lines.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use cmdslot_config::{LogFormat, LogSettings};

const TELEMETRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::telemetry");

/// Format of the subscriber installed by the first successful call.
static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Proof that telemetry is installed.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Format events are rendered in. Later calls to [`initialise`] report
    /// the format chosen by the first one.
    pub fn format(&self) -> LogFormat {
        self.format
    }
}

/// Errors raised while installing telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The filter directive does not parse.
    #[error("log filter `{directive}` is invalid: {source}")]
    Filter {
        directive: String,
        #[source]
        source: ParseError,
    },
    /// Something else already installed a global subscriber.
    #[error("cannot install the log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Installs the subscriber described by `settings` on the first call.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or another
/// subscriber is already installed.
pub fn initialise(settings: &LogSettings) -> Result<TelemetryHandle, TelemetryError> {
    let format = INSTALLED_FORMAT.get_or_try_init(|| {
        install(settings)?;
        Ok::<_, TelemetryError>(settings.format())
    })?;
    Ok(TelemetryHandle { format: *format })
}

fn install(settings: &LogSettings) -> Result<(), TelemetryError> {
    let filter = parse_filter(settings.filter())?;
    let output = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_thread_names(true)
        .with_timer(UtcTime::rfc_3339());
    let output: Box<dyn Layer<Registry> + Send + Sync> = match settings.format() {
        LogFormat::Json => output.json().flatten_event(true).boxed(),
        LogFormat::Compact => output.compact().boxed(),
    };
    tracing_subscriber::registry()
        .with(output)
        .with(filter)
        .try_init()?;
    tracing::debug!(
        target: TELEMETRY_TARGET,
        format = %settings.format(),
        filter = settings.filter(),
        "telemetry installed"
    );
    Ok(())
}

fn parse_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directive).map_err(|source| TelemetryError::Filter {
        directive: directive.to_string(),
        source,
    })
}

//! Structured logging setup.
//!
//! The stage logs through `tracing`; hosts that already install a subscriber
//! need nothing from here. Standalone users call [`init`] with the
//! [`LoggingConfig`] from their configuration.


use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Error type for logging operations
#[derive(Debug)]
pub enum LogError {
    /// IO error occurred
    IoError(std::io::Error),

    /// Error parsing log level
    InvalidLogLevel(String),

    /// Error in subscriber setup
    SubscriberError(Box<dyn std::error::Error + Send + Sync>),
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::IoError(err)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for LogError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        LogError::SubscriberError(err)
    }
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Subscriber the output layers are stacked on
type Filtered = Layered<EnvFilter, Registry>;

/// One output sink
type BoxedLayer = Box<dyn Layer<Filtered> + Send + Sync>;

/// Initialize the global subscriber with the given configuration.
///
/// `RUST_LOG` overrides the configured level when set. Stdout and the log
/// file are independent sinks; with both configured every event goes to
/// both. When logging to a file the returned guard must be kept alive for
/// buffered lines to be flushed. A subscriber installed earlier is left in
/// place.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    if tracing::dispatcher::has_been_set() {
        return Ok(None);
    }

    let (layers, guard) = output_layers(config)?;
    if layers.is_empty() {
        return Ok(None);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .map_err(|e| LogError::SubscriberError(Box::new(e)))?;

    Ok(guard)
}

/// Build the stdout and file layers selected by `config`.
pub(crate) fn output_layers(
    config: &LoggingConfig,
) -> Result<(Vec<BoxedLayer>, Option<WorkerGuard>)> {
    let mut layers = Vec::new();
    let mut guard = None;

    if config.stdout {
        layers.push(format_layer(config.format, std::io::stdout, true));
    }

    if let Some(path) = &config.file {
        let (writer, file_guard) = create_non_blocking_file(path)?;
        layers.push(format_layer(config.format, writer, false));
        guard = Some(file_guard);
    }

    Ok((layers, guard))
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_level(true)
        .with_target(true)
        .with_line_number(true);

    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Default => layer.boxed(),
    }
}

/// Create a non-blocking file writer.
fn create_non_blocking_file(path: impl AsRef<Path>) -> Result<(NonBlocking, WorkerGuard)> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(".")),
        path.file_name().unwrap_or_default(),
    );

    Ok(tracing_appender::non_blocking(file_appender))
}

/// Parse a log level string into a LogLevel enum.
pub fn parse_log_level(level: &str) -> Result<LogLevel> {
    level.parse().map_err(|_| LogError::InvalidLogLevel(level.to_string()))
}

/// Convert a tracing::Level to a LogLevel enum.
pub fn level_to_log_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::IoError(e) => write!(f, "IO error: {}", e),
            LogError::SubscriberError(e) => write!(f, "Subscriber error: {}", e),
            LogError::InvalidLogLevel(s) => write!(f, "Invalid log level: {}", s),
        }
    }
}

impl std::error::Error for LogError {}

//! Tracing subscriber setup.
//!
//! Installs a global `tracing` subscriber with a console layer and, when a log
//! directory is configured, a daily rolling file written through a
//! non-blocking worker. `RUST_LOG` overrides the configured filter.
//!
//! # Example
//!
//! ```ignore
//! let config = RrmConfig::from_file("/etc/wifi-rrm.ini")?;
//! let _guard = init_logging(&config.logging)?;
//! tracing::info!("started");
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter {filter:?}: {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// The log directory could not be created.
    #[error("failed to create log directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rolling file appender could not be created.
    #[error("failed to create log file appender: {0}")]
    Appender(#[from] rolling::InitError),

    /// A global subscriber is already installed.
    #[error("failed to install subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Keeps the file writer alive. Dropping it flushes buffered log lines.
#[derive(Debug)]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Directory holding the rolling log files, if file logging is enabled.
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Build the filter: `RUST_LOG` if set and valid, else the configured directive.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|source| LoggingError::Filter {
        filter: config.filter.clone(),
        source,
    })
}

/// Install the global subscriber described by `config`.
///
/// Keep the returned guard for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(config)?;

    let console_layer = tracing_subscriber::fmt::layer().with_target(true);

    let (file_layer, file_guard) = match &config.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::Directory {
                path: dir.clone(),
                source,
            })?;
            let appender = rolling::Builder::new()
                .rotation(Rotation::DAILY)
                .filename_prefix(&config.file_prefix)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    let guard = LoggingGuard {
        _file_guard: file_guard,
        log_dir: config.directory.clone(),
    };
    match guard.log_dir() {
        Some(dir) => info!(
            filter = %config.filter,
            log_dir = %dir.display(),
            "Logging initialized"
        ),
        None => info!(filter = %config.filter, "Logging initialized, console only"),
    }
    Ok(guard)
}

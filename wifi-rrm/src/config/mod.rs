//! Runtime configuration.
//!
//! [`RrmConfig`] groups the tunables of the modeler, the transmit power
//! optimizers and logging. Every value has a default, so an empty file (or no
//! file at all) yields a working configuration.
//!
//! # File Format
//!
//! ```ini
//! [modeler]
//! wifi_scan_buffer_size = 10
//! queue_capacity = 1000
//! backfill_concurrency = 8
//!
//! [tpc]
//! min_tx_power = 0
//! max_tx_power = 30
//! target_mcs = 8
//!
//! [logging]
//! filter = info
//! directory = /var/log/wifi-rrm
//! file_prefix = wifi-rrm.log
//! ```
//!
//! Unknown sections and keys are ignored.

mod error;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{Ini, Properties};

pub use error::ConfigError;

/// Default number of wifi scan batches retained per device.
pub const DEFAULT_WIFI_SCAN_BUFFER_SIZE: usize = 10;

/// Default capacity of the modeler input queue, in batches.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Default number of concurrent latest-stats requests during backfill.
pub const DEFAULT_BACKFILL_CONCURRENCY: usize = 8;

/// Default minimum transmit power in dBm.
pub const DEFAULT_MIN_TX_POWER: i32 = 0;

/// Default maximum transmit power in dBm.
pub const DEFAULT_MAX_TX_POWER: i32 = 30;

/// Default target MCS index for measurement-based TPC.
pub const DEFAULT_TARGET_MCS: i32 = 8;

/// Default tracing filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log file name prefix.
pub const DEFAULT_LOG_FILE_PREFIX: &str = "wifi-rrm.log";

// =============================================================================
// Sections
// =============================================================================

/// Modeler settings (`[modeler]`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelerParams {
    /// Maximum number of wifi scan batches kept per device.
    pub wifi_scan_buffer_size: usize,

    /// Capacity of the input queue between listeners and the modeler task.
    pub queue_capacity: usize,

    /// Concurrent latest-stats requests during the initial backfill.
    pub backfill_concurrency: usize,
}

impl Default for ModelerParams {
    fn default() -> Self {
        Self {
            wifi_scan_buffer_size: DEFAULT_WIFI_SCAN_BUFFER_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            backfill_concurrency: DEFAULT_BACKFILL_CONCURRENCY,
        }
    }
}

impl ModelerParams {
    /// Set the wifi scan buffer size.
    pub fn with_wifi_scan_buffer_size(mut self, size: usize) -> Self {
        self.wifi_scan_buffer_size = size;
        self
    }

    /// Set the input queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the backfill concurrency.
    pub fn with_backfill_concurrency(mut self, concurrency: usize) -> Self {
        self.backfill_concurrency = concurrency;
        self
    }
}

/// Transmit power control settings (`[tpc]`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TpcParams {
    /// Lowest transmit power an optimizer may assign, in dBm.
    pub min_tx_power: i32,

    /// Highest transmit power an optimizer may assign, in dBm.
    pub max_tx_power: i32,

    /// Target MCS index for measurement-based TPC.
    pub target_mcs: i32,
}

impl Default for TpcParams {
    fn default() -> Self {
        Self {
            min_tx_power: DEFAULT_MIN_TX_POWER,
            max_tx_power: DEFAULT_MAX_TX_POWER,
            target_mcs: DEFAULT_TARGET_MCS,
        }
    }
}

impl TpcParams {
    /// Set the transmit power range.
    pub fn with_tx_power_range(mut self, min: i32, max: i32) -> Self {
        self.min_tx_power = min;
        self.max_tx_power = max;
        self
    }

    /// Set the target MCS index.
    pub fn with_target_mcs(mut self, mcs: i32) -> Self {
        self.target_mcs = mcs;
        self
    }
}

/// Logging settings (`[logging]`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` takes precedence.
    pub filter: String,

    /// Directory for daily rolling log files. Console only when `None`.
    pub directory: Option<PathBuf>,

    /// File name prefix for rolling log files.
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            directory: None,
            file_prefix: DEFAULT_LOG_FILE_PREFIX.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Set the filter directive.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Also write logs to daily rolling files in `directory`.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }
}

// =============================================================================
// Top-level Config
// =============================================================================

/// All runtime configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RrmConfig {
    /// Modeler settings.
    pub modeler: ModelerParams,

    /// Transmit power control settings.
    pub tpc: TpcParams,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl RrmConfig {
    /// Parse configuration from INI text and validate it.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text)?;
        Self::from_ini(&ini)
    }

    /// Load configuration from an INI file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("modeler")) {
            let modeler = &mut config.modeler;
            read_value(
                section,
                "modeler",
                "wifi_scan_buffer_size",
                &mut modeler.wifi_scan_buffer_size,
            )?;
            read_value(section, "modeler", "queue_capacity", &mut modeler.queue_capacity)?;
            read_value(
                section,
                "modeler",
                "backfill_concurrency",
                &mut modeler.backfill_concurrency,
            )?;
        }

        if let Some(section) = ini.section(Some("tpc")) {
            let tpc = &mut config.tpc;
            read_value(section, "tpc", "min_tx_power", &mut tpc.min_tx_power)?;
            read_value(section, "tpc", "max_tx_power", &mut tpc.max_tx_power)?;
            read_value(section, "tpc", "target_mcs", &mut tpc.target_mcs)?;
        }

        if let Some(section) = ini.section(Some("logging")) {
            let logging = &mut config.logging;
            if let Some(filter) = section.get("filter") {
                logging.filter = filter.trim().to_string();
            }
            if let Some(directory) = section.get("directory") {
                let directory = directory.trim();
                logging.directory = (!directory.is_empty()).then(|| PathBuf::from(directory));
            }
            if let Some(prefix) = section.get("file_prefix") {
                logging.file_prefix = prefix.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("wifi_scan_buffer_size", self.modeler.wifi_scan_buffer_size),
            ("queue_capacity", self.modeler.queue_capacity),
            ("backfill_concurrency", self.modeler.backfill_concurrency),
        ];
        if let Some((key, _)) = positive.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::invalid("modeler", key, "must be at least 1"));
        }
        if self.tpc.min_tx_power > self.tpc.max_tx_power {
            return Err(ConfigError::invalid(
                "tpc",
                "min_tx_power",
                format!(
                    "{} is greater than max_tx_power {}",
                    self.tpc.min_tx_power, self.tpc.max_tx_power
                ),
            ));
        }
        Ok(())
    }
}

fn read_value<T: FromStr>(
    section: &Properties,
    section_name: &'static str,
    key: &'static str,
    target: &mut T,
) -> Result<(), ConfigError>
where
    T::Err: std::fmt::Display,
{
    if let Some(raw) = section.get(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(section_name, key, format!("{raw:?}: {e}")))?;
    }
    Ok(())
}

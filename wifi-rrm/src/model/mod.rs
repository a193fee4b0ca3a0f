//! Device telemetry model.
//!
//! This module holds the types parsed out of device telemetry and the shared
//! [`DataModel`] that the modeler maintains and the optimizers read.
//!
//! # Architecture
//!
//! ```text
//! Telemetry payloads ──► State / WifiScanEntry ──► DataModel ──► Optimizers
//!   (serde_json::Value)    (parsed, validated)     (per-device maps)
//! ```

mod data_model;
mod device_status;
mod state;
mod wifi_scan;

use thiserror::Error;

pub use data_model::{DataModel, DeviceMap, RevalidationReport, WifiScanHistory};
pub use device_status::{ApConfiguration, DeviceCapabilities};
pub use state::{Association, Interface, Radio, Ssid, State};
pub use wifi_scan::{parse_wifi_scan_entries, WifiScanEntry};

/// Errors raised while parsing a telemetry payload.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A required member is missing or has the wrong JSON type.
    #[error("missing or invalid field `{0}`")]
    MissingField(&'static str),

    /// The payload does not match the expected shape.
    #[error("invalid payload: {0}")]
    Invalid(#[from] serde_json::Error),
}

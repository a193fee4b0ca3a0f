//! Listener contracts for pushed telemetry, capabilities and configuration.
//!
//! # Execution Context
//!
//! Listener methods run synchronously on whatever thread the source invokes
//! them from (a broker consumer thread, a collector task, ...). They must not
//! block for long and must be safe to call concurrently with each other and
//! with the modeler task.

use std::sync::Arc;

use serde_json::Value;

use crate::model::{ApConfiguration, DeviceCapabilities};

/// One telemetry record from the streaming broker.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    /// Serial number of the reporting device.
    pub serial_number: String,

    /// Unparsed record payload.
    pub payload: Value,
}

impl TelemetryRecord {
    /// Create a record.
    pub fn new(serial_number: impl Into<String>, payload: Value) -> Self {
        Self {
            serial_number: serial_number.into(),
            payload,
        }
    }
}

/// Receives batches of telemetry records.
pub trait TelemetryListener: Send + Sync {
    /// Handle a batch of device state records.
    fn handle_state_records(&self, records: Vec<TelemetryRecord>);

    /// Handle a batch of wifi scan records.
    fn handle_wifi_scan_records(&self, records: Vec<TelemetryRecord>);
}

/// A source of telemetry batches.
pub trait TelemetrySource {
    /// Register a listener under `id`. Re-registering an id replaces it.
    fn add_telemetry_listener(&self, id: &str, listener: Arc<dyn TelemetryListener>);
}

/// Receives device capability changes.
pub trait CapabilityListener: Send + Sync {
    /// Handle a device's new capabilities.
    fn process_device_capabilities(&self, serial: &str, capabilities: DeviceCapabilities);
}

/// A source of capability changes.
pub trait CapabilitySource {
    /// Register a listener under `id`. Re-registering an id replaces it.
    fn add_capability_listener(&self, id: &str, listener: Arc<dyn CapabilityListener>);
}

/// Receives device configuration changes.
pub trait ConfigListener: Send + Sync {
    /// Handle a device's new configuration.
    ///
    /// Returns `true` if the listener modified the configuration and the
    /// source should push it again.
    fn process_device_config(&self, serial: &str, config: &ApConfiguration) -> bool;
}

/// A source of configuration changes.
pub trait ConfigSource {
    /// Register a listener under `id`. Re-registering an id replaces it.
    fn add_config_listener(&self, id: &str, listener: Arc<dyn ConfigListener>);
}

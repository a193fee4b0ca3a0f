//! Contracts with the device gateway and telemetry sources.
//!
//! The RRM core does not talk to devices itself. It consumes:
//!
//! - [`GatewayClient`]: request/response access to the device gateway (device
//!   inventory and stored statistics), used once at modeler startup.
//! - Listener registration ([`TelemetrySource`], [`CapabilitySource`],
//!   [`ConfigSource`]): push notifications from the streaming broker consumer,
//!   the capability collector and the config manager.
//!
//! [`ListenerHub`] is an in-process implementation of the three sources that
//! fans each notification out to every registered listener.

mod hub;
mod listeners;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use hub::ListenerHub;
pub use listeners::{
    CapabilityListener, CapabilitySource, ConfigListener, ConfigSource, TelemetryListener,
    TelemetryRecord, TelemetrySource,
};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A device as listed by the gateway inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceWithStatus {
    /// Device serial number.
    #[serde(rename = "serialNumber")]
    pub serial_number: String,

    /// Whether the device currently holds a gateway connection.
    #[serde(default)]
    pub connected: bool,
}

impl DeviceWithStatus {
    /// A connected device.
    pub fn new(serial_number: impl Into<String>) -> Self {
        Self {
            serial_number: serial_number.into(),
            connected: true,
        }
    }
}

/// Stored statistics records for one device, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecords {
    /// Device serial number.
    #[serde(rename = "serialNumber", default)]
    pub serial_number: String,

    /// The records.
    #[serde(default)]
    pub data: Vec<StatisticsDetails>,
}

/// One stored statistics record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsDetails {
    /// The state document the device reported.
    #[serde(default)]
    pub data: Option<Value>,

    /// Configuration UUID active when the record was taken.
    #[serde(default)]
    pub uuid: u64,

    /// Unix timestamp (seconds) of the record.
    #[serde(default)]
    pub recorded: u64,
}

/// Request/response access to the device gateway.
///
/// Failures are reported as `None`; callers log and carry on rather than
/// propagating transport errors.
pub trait GatewayClient: Send + Sync {
    /// List all devices known to the gateway.
    fn list_devices(&self) -> BoxFuture<'_, Option<Vec<DeviceWithStatus>>>;

    /// Fetch the `count` most recent statistics records of a device.
    fn latest_stats<'a>(
        &'a self,
        serial: &'a str,
        count: usize,
    ) -> BoxFuture<'a, Option<StatisticsRecords>>;
}

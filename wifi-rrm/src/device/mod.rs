//! Device configuration as seen by the RRM core.
//!
//! Device configuration (RRM enablement, floor-plan location, allowed transmit
//! powers) is owned by an external store. The core only reads it through
//! [`DeviceConfigLookup`] and writes optimizer results back through
//! [`TxPowerApplier`]. [`DeviceRegistry`] is an in-memory implementation of
//! both, used when no external store is wired in and throughout the tests.

mod registry;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::optimizers::TxPowerMap;

pub use registry::DeviceRegistry;

/// Per-device attributes consulted by the modeler and optimizers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Whether RRM manages this device.
    #[serde(default)]
    pub enable_rrm: bool,

    /// Floor-plan coordinates. Only 2-D locations are usable by optimizers.
    #[serde(default)]
    pub location: Option<Vec<i32>>,

    /// Allowed transmit powers (dBm) per band.
    #[serde(default)]
    pub allowed_tx_powers: Option<HashMap<String, Vec<i32>>>,

    /// Extent of the deployment area in floor-plan units.
    #[serde(default)]
    pub boundary: Option<i32>,
}

impl DeviceConfig {
    /// An RRM-enabled device with no location or power restrictions.
    pub fn enabled() -> Self {
        Self {
            enable_rrm: true,
            ..Self::default()
        }
    }

    /// An RRM-disabled device.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Set a 2-D location.
    pub fn with_location(mut self, x: i32, y: i32) -> Self {
        self.location = Some(vec![x, y]);
        self
    }

    /// Restrict the transmit powers allowed on `band`.
    pub fn with_allowed_tx_powers(mut self, band: impl Into<String>, powers: Vec<i32>) -> Self {
        self.allowed_tx_powers
            .get_or_insert_with(HashMap::new)
            .insert(band.into(), powers);
        self
    }

    /// Set the deployment boundary.
    pub fn with_boundary(mut self, boundary: i32) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// The allow-list for `band`, if one is configured.
    pub fn allowed_tx_powers_for(&self, band: &str) -> Option<&[i32]> {
        self.allowed_tx_powers
            .as_ref()
            .and_then(|bands| bands.get(band))
            .map(Vec::as_slice)
    }
}

/// Read access to device configuration.
///
/// Implementations must be safe to call from the modeler task, from listener
/// hooks on foreign threads, and from optimizer tasks concurrently.
pub trait DeviceConfigLookup: Send + Sync {
    /// Configuration for one device, or `None` if the device is unknown.
    fn device_config(&self, serial: &str) -> Option<DeviceConfig>;

    /// Configuration for every known device in `zone`, keyed by serial.
    fn zone_device_configs(&self, zone: &str) -> HashMap<String, DeviceConfig>;

    /// Whether RRM manages `serial`. Unknown devices are not managed.
    fn is_rrm_enabled(&self, serial: &str) -> bool {
        self.device_config(serial)
            .map(|config| config.enable_rrm)
            .unwrap_or(false)
    }
}

/// Applies computed transmit powers to devices.
pub trait TxPowerApplier: Send + Sync {
    /// Apply the given device -> band -> dBm assignments.
    fn apply_tx_powers(&self, tx_power_map: &TxPowerMap);
}

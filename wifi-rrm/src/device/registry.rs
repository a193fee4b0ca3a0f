//! In-memory device registry.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use dashmap::DashMap;
use tracing::info;

use super::{DeviceConfig, DeviceConfigLookup, TxPowerApplier};
use crate::optimizers::TxPowerMap;

/// In-memory device configuration and zone topology.
///
/// Backed by sharded `DashMap`s; safe to use from any thread.
///
/// # Example
///
/// ```
/// use wifi_rrm::device::{DeviceConfig, DeviceConfigLookup, DeviceRegistry};
///
/// let registry = DeviceRegistry::new();
/// registry.set_device_config("aaaaaaaaaaaa", DeviceConfig::enabled().with_location(1, 1));
/// registry.add_to_zone("lobby", "aaaaaaaaaaaa");
///
/// assert!(registry.is_rrm_enabled("aaaaaaaaaaaa"));
/// assert_eq!(registry.zone_device_configs("lobby").len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    configs: DashMap<String, DeviceConfig>,
    zones: DashMap<String, BTreeSet<String>>,
    auto_tx_powers: DashMap<String, BTreeMap<String, i32>>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the configuration of a device.
    pub fn set_device_config(&self, serial: impl Into<String>, config: DeviceConfig) {
        self.configs.insert(serial.into(), config);
    }

    /// Enable or disable RRM for a known device. Returns `false` if unknown.
    pub fn set_rrm_enabled(&self, serial: &str, enabled: bool) -> bool {
        match self.configs.get_mut(serial) {
            Some(mut config) => {
                config.enable_rrm = enabled;
                true
            }
            None => false,
        }
    }

    /// Add a device to a zone.
    pub fn add_to_zone(&self, zone: impl Into<String>, serial: impl Into<String>) {
        self.zones.entry(zone.into()).or_default().insert(serial.into());
    }

    /// Serial numbers of all devices in a zone, sorted.
    pub fn zone_devices(&self, zone: &str) -> Vec<String> {
        self.zones
            .get(zone)
            .map(|devices| devices.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Transmit powers last applied to a device, per band.
    pub fn auto_tx_powers(&self, serial: &str) -> Option<BTreeMap<String, i32>> {
        self.auto_tx_powers.get(serial).map(|powers| powers.value().clone())
    }
}

impl DeviceConfigLookup for DeviceRegistry {
    fn device_config(&self, serial: &str) -> Option<DeviceConfig> {
        self.configs.get(serial).map(|config| config.value().clone())
    }

    fn zone_device_configs(&self, zone: &str) -> HashMap<String, DeviceConfig> {
        self.zone_devices(zone)
            .into_iter()
            .filter_map(|serial| {
                let config = self.device_config(&serial)?;
                Some((serial, config))
            })
            .collect()
    }
}

impl TxPowerApplier for DeviceRegistry {
    fn apply_tx_powers(&self, tx_power_map: &TxPowerMap) {
        for (serial, bands) in tx_power_map {
            let mut powers = self.auto_tx_powers.entry(serial.clone()).or_default();
            for (band, power) in bands {
                powers.insert(band.clone(), *power);
            }
            info!(device = %serial, tx_powers = ?bands, "Applied tx powers");
        }
    }
}

//! Read-only inputs shared by all optimizers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::device::{DeviceConfig, DeviceConfigLookup};
use crate::model::{DataModel, State};

/// The model, zone and zone device configuration an optimizer runs against.
///
/// Device configuration is captured once at construction. Only devices that
/// belong to the zone and have RRM enabled are visible to the optimizer.
#[derive(Debug, Clone)]
pub struct OptimizerContext {
    model: Arc<DataModel>,
    zone: String,
    device_configs: HashMap<String, DeviceConfig>,
}

impl OptimizerContext {
    /// Capture the zone's RRM-enabled device configuration.
    ///
    /// Pass `Arc::new(handle.data_model_copy())` instead of the live model when
    /// the whole pass must see one consistent view.
    pub fn new(
        model: Arc<DataModel>,
        zone: impl Into<String>,
        devices: &dyn DeviceConfigLookup,
    ) -> Self {
        let zone = zone.into();
        let device_configs = devices
            .zone_device_configs(&zone)
            .into_iter()
            .filter(|(_, config)| config.enable_rrm)
            .collect();
        Self {
            model,
            zone,
            device_configs,
        }
    }

    /// The zone being optimized.
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// The model being read.
    pub fn model(&self) -> &DataModel {
        &self.model
    }

    /// Configuration of a participating device.
    pub fn device_config(&self, serial: &str) -> Option<&DeviceConfig> {
        self.device_configs.get(serial)
    }

    /// Latest states of participating devices, sorted by serial number.
    pub fn zone_states(&self) -> Vec<(String, State)> {
        self.model
            .states()
            .entries()
            .into_iter()
            .filter(|(serial, _)| self.device_configs.contains_key(serial))
            .collect()
    }

    /// Serial numbers of participating devices, sorted.
    pub fn zone_devices(&self) -> Vec<String> {
        let mut serials: Vec<String> = self.device_configs.keys().cloned().collect();
        serials.sort();
        serials
    }
}

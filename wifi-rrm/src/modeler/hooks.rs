//! Synchronous model hooks for capability and configuration changes.

use std::sync::Arc;

use tracing::{info, warn};

use crate::gateway::{CapabilityListener, ConfigListener};
use crate::model::{ApConfiguration, DataModel, DeviceCapabilities};

/// Writes capability and configuration changes straight into the model.
///
/// Runs on the notifying thread; the per-map locks of [`DataModel`] make the
/// writes safe alongside the modeler task.
#[derive(Debug, Clone)]
pub struct ModelUpdater {
    data_model: Arc<DataModel>,
}

impl ModelUpdater {
    /// Create a hook writing into `data_model`.
    pub fn new(data_model: Arc<DataModel>) -> Self {
        Self { data_model }
    }
}

impl CapabilityListener for ModelUpdater {
    fn process_device_capabilities(&self, serial: &str, capabilities: DeviceCapabilities) {
        match capabilities.wifi() {
            Some(wifi) => {
                self.data_model.capabilities().insert(serial, wifi.clone());
            }
            None => warn!(device = serial, "Capability report has no wifi object, ignoring"),
        }
    }
}

impl ConfigListener for ModelUpdater {
    fn process_device_config(&self, serial: &str, config: &ApConfiguration) -> bool {
        let new_radios = config.radio_config_list();
        let new_bands = ApConfiguration::radio_bands(&new_radios);
        let old_radios = self.data_model.device_status().insert(serial, new_radios);
        let old_bands = ApConfiguration::radio_bands(old_radios.as_deref().unwrap_or_default());

        if old_bands != new_bands {
            info!(
                device = serial,
                bands = ?new_bands,
                previous = ?old_bands,
                "Device radio bands changed"
            );
        }

        false
    }
}

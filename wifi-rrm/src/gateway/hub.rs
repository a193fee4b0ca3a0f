//! In-process listener hub.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::listeners::{
    CapabilityListener, CapabilitySource, ConfigListener, ConfigSource, TelemetryListener,
    TelemetryRecord, TelemetrySource,
};
use crate::model::{ApConfiguration, DeviceCapabilities};

/// Listeners of one kind, in registration order.
struct Registered<L: ?Sized> {
    entries: RwLock<Vec<(String, Arc<L>)>>,
}

impl<L: ?Sized> Default for Registered<L> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl<L: ?Sized> Registered<L> {
    fn register(&self, id: &str, listener: Arc<L>) {
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|(existing, _)| existing == id) {
            Some(entry) => entry.1 = listener,
            None => entries.push((id.to_string(), listener)),
        }
    }

    fn listeners(&self) -> Vec<Arc<L>> {
        self.entries
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    fn ids(&self) -> Vec<String> {
        self.entries.read().iter().map(|(id, _)| id.clone()).collect()
    }
}

/// Fans pushed notifications out to registered listeners.
///
/// The broker consumer, capability collector and config manager call the
/// `publish_*` methods; every listener runs on the publishing thread, in
/// registration order. The registry lock is not held while listeners run.
#[derive(Default)]
pub struct ListenerHub {
    telemetry: Registered<dyn TelemetryListener>,
    capability: Registered<dyn CapabilityListener>,
    config: Registered<dyn ConfigListener>,
}

impl fmt::Debug for ListenerHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHub")
            .field("telemetry", &self.telemetry.ids())
            .field("capability", &self.capability.ids())
            .field("config", &self.config.ids())
            .finish()
    }
}

impl ListenerHub {
    /// Create a hub with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a batch of state records to every telemetry listener.
    pub fn publish_state_records(&self, records: Vec<TelemetryRecord>) {
        for listener in self.telemetry.listeners() {
            listener.handle_state_records(records.clone());
        }
    }

    /// Deliver a batch of wifi scan records to every telemetry listener.
    pub fn publish_wifi_scan_records(&self, records: Vec<TelemetryRecord>) {
        for listener in self.telemetry.listeners() {
            listener.handle_wifi_scan_records(records.clone());
        }
    }

    /// Deliver a capability change to every capability listener.
    pub fn publish_capabilities(&self, serial: &str, capabilities: DeviceCapabilities) {
        for listener in self.capability.listeners() {
            listener.process_device_capabilities(serial, capabilities.clone());
        }
    }

    /// Deliver a configuration change to every config listener.
    ///
    /// Returns `true` if any listener asked for the configuration to be pushed
    /// again.
    pub fn publish_config(&self, serial: &str, config: &ApConfiguration) -> bool {
        let mut modified = false;
        for listener in self.config.listeners() {
            modified |= listener.process_device_config(serial, config);
        }
        modified
    }

    /// Ids of the registered telemetry listeners.
    pub fn telemetry_listener_ids(&self) -> Vec<String> {
        self.telemetry.ids()
    }
}

impl TelemetrySource for ListenerHub {
    fn add_telemetry_listener(&self, id: &str, listener: Arc<dyn TelemetryListener>) {
        self.telemetry.register(id, listener);
    }
}

impl CapabilitySource for ListenerHub {
    fn add_capability_listener(&self, id: &str, listener: Arc<dyn CapabilityListener>) {
        self.capability.register(id, listener);
    }
}

impl ConfigSource for ListenerHub {
    fn add_config_listener(&self, id: &str, listener: Arc<dyn ConfigListener>) {
        self.config.register(id, listener);
    }
}

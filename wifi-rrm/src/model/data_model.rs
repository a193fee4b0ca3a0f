//! The shared per-device data model.
//!
//! [`DataModel`] aggregates the latest telemetry for every RRM-enabled device.
//! It is written by the modeler (ingestion task and its hooks) and read by
//! optimizers running on other tasks.
//!
//! # Concurrency
//!
//! Each map is a [`DeviceMap`] guarded by its own `parking_lot::RwLock`, so
//! every operation on a single map is atomic, including [`DeviceMap::retain`]
//! during revalidation. There is no lock spanning maps: a reader may observe
//! a device's new state next to its old capabilities. Readers that need one
//! consistent view across a whole pass take [`DataModel::deep_copy`].

use std::collections::{HashMap, VecDeque};
use std::fmt;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use super::{State, WifiScanEntry};

/// Scan batches retained for one device, oldest first.
pub type WifiScanHistory = VecDeque<Vec<WifiScanEntry>>;

// =============================================================================
// Device Map
// =============================================================================

/// A lock-guarded map from device serial number to a value.
///
/// Values are returned by clone so no lock is held by callers.
pub struct DeviceMap<V> {
    inner: RwLock<HashMap<String, V>>,
}

impl<V> Default for DeviceMap<V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for DeviceMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.inner.read().iter()).finish()
    }
}

impl<V: Clone> DeviceMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the value for `serial`.
    pub fn get(&self, serial: &str) -> Option<V> {
        self.inner.read().get(serial).cloned()
    }

    /// Insert or replace the value for `serial`, returning the previous value.
    pub fn insert(&self, serial: impl Into<String>, value: V) -> Option<V> {
        self.inner.write().insert(serial.into(), value)
    }

    /// Remove the value for `serial`.
    pub fn remove(&self, serial: &str) -> Option<V> {
        self.inner.write().remove(serial)
    }

    /// Returns `true` if `serial` has a value.
    pub fn contains(&self, serial: &str) -> bool {
        self.inner.read().contains_key(serial)
    }

    /// Number of devices in the map.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// All serial numbers, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Copies of all entries, sorted by serial number.
    pub fn entries(&self) -> Vec<(String, V)> {
        let mut entries: Vec<(String, V)> = self
            .inner
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Keep only the entries whose serial satisfies `keep`.
    ///
    /// Runs under a single write lock. Returns `true` if anything was removed.
    pub fn retain(&self, mut keep: impl FnMut(&str) -> bool) -> bool {
        let mut map = self.inner.write();
        let before = map.len();
        map.retain(|serial, _| keep(serial.as_str()));
        map.len() != before
    }

    /// Mutate the value for `serial` in place, creating it first if absent.
    pub fn upsert_with<R>(
        &self,
        serial: &str,
        create: impl FnOnce() -> V,
        update: impl FnOnce(&mut V) -> R,
    ) -> R {
        let mut map = self.inner.write();
        let value = map.entry(serial.to_string()).or_insert_with(create);
        update(value)
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    fn deep_copy(&self) -> Self {
        Self {
            inner: RwLock::new(self.inner.read().clone()),
        }
    }
}

// =============================================================================
// Data Model
// =============================================================================

/// Which maps lost entries during a revalidation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevalidationReport {
    /// Wifi scan histories were removed.
    pub wifi_scans: bool,
    /// States were removed.
    pub states: bool,
    /// Device status (radio config lists) were removed.
    pub device_status: bool,
    /// Capabilities were removed.
    pub capabilities: bool,
}

impl RevalidationReport {
    /// Returns `true` if any map lost entries.
    pub fn any(&self) -> bool {
        self.wifi_scans || self.states || self.device_status || self.capabilities
    }
}

/// Latest telemetry for every tracked device.
#[derive(Debug, Default)]
pub struct DataModel {
    latest_wifi_scans: DeviceMap<WifiScanHistory>,
    latest_state: DeviceMap<State>,
    latest_device_status: DeviceMap<Vec<Value>>,
    latest_device_capabilities: DeviceMap<Value>,
}

impl DataModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest state per device.
    pub fn states(&self) -> &DeviceMap<State> {
        &self.latest_state
    }

    /// Recent wifi scan batches per device.
    pub fn wifi_scans(&self) -> &DeviceMap<WifiScanHistory> {
        &self.latest_wifi_scans
    }

    /// Latest radio configuration list per device.
    pub fn device_status(&self) -> &DeviceMap<Vec<Value>> {
        &self.latest_device_status
    }

    /// Latest wifi capabilities per device.
    pub fn capabilities(&self) -> &DeviceMap<Value> {
        &self.latest_device_capabilities
    }

    /// Append a scan batch to a device's history.
    ///
    /// Evicts the oldest batches first so that at most `capacity` batches are
    /// retained. A `capacity` of zero is treated as one.
    pub fn append_wifi_scan(&self, serial: &str, entries: Vec<WifiScanEntry>, capacity: usize) {
        let capacity = capacity.max(1);
        self.latest_wifi_scans
            .upsert_with(serial, VecDeque::new, |history| {
                while history.len() >= capacity {
                    history.pop_front();
                }
                history.push_back(entries);
            });
    }

    /// Remove all entries for devices for which `is_enabled` returns `false`.
    ///
    /// Each map is pruned under its own write lock.
    pub fn revalidate(&self, is_enabled: impl Fn(&str) -> bool) -> RevalidationReport {
        let report = RevalidationReport {
            wifi_scans: self.latest_wifi_scans.retain(&is_enabled),
            states: self.latest_state.retain(&is_enabled),
            device_status: self.latest_device_status.retain(&is_enabled),
            capabilities: self.latest_device_capabilities.retain(&is_enabled),
        };

        if report.wifi_scans {
            debug!("Removed some wifi scan entries from data model");
        }
        if report.states {
            debug!("Removed some state entries from data model");
        }
        if report.device_status {
            debug!("Removed some status entries from data model");
        }
        if report.capabilities {
            debug!("Removed some capabilities entries from data model");
        }

        report
    }

    /// Independent copy sharing no mutable structure with this model.
    pub fn deep_copy(&self) -> DataModel {
        DataModel {
            latest_wifi_scans: self.latest_wifi_scans.deep_copy(),
            latest_state: self.latest_state.deep_copy(),
            latest_device_status: self.latest_device_status.deep_copy(),
            latest_device_capabilities: self.latest_device_capabilities.deep_copy(),
        }
    }

    /// Remove every entry from every map.
    pub fn clear(&self) {
        self.latest_wifi_scans.clear();
        self.latest_state.clear();
        self.latest_device_status.clear();
        self.latest_device_capabilities.clear();
    }
}

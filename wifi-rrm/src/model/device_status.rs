//! Device configuration and capability reports.
//!
//! These are opaque JSON blobs from the model's point of view. The modeler
//! keeps the latest copy of each for change detection and for optimizers that
//! need to know which bands a device has configured.

use std::collections::BTreeSet;

use serde_json::Value;

/// An access point configuration document as pushed to the device.
#[derive(Debug, Clone, PartialEq)]
pub struct ApConfiguration {
    config: Value,
}

impl ApConfiguration {
    /// Wrap a configuration document.
    pub fn new(config: Value) -> Self {
        Self { config }
    }

    /// The radio configuration list (`radios` member), or empty if absent.
    pub fn radio_config_list(&self) -> Vec<Value> {
        self.config
            .get("radios")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    /// The set of bands configured in a radio configuration list.
    ///
    /// Radios without a string `band` member are ignored.
    pub fn radio_bands(radios: &[Value]) -> BTreeSet<String> {
        radios
            .iter()
            .filter_map(|radio| radio.get("band").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }
}

/// A capability report as published by the device gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCapabilities {
    /// Full capability document.
    pub capabilities: Value,
}

impl DeviceCapabilities {
    /// Wrap a capability document.
    pub fn new(capabilities: Value) -> Self {
        Self { capabilities }
    }

    /// The wifi capability object (`wifi` member), if present.
    pub fn wifi(&self) -> Option<&Value> {
        self.capabilities.get("wifi").filter(|v| v.is_object())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_radio_bands() {
        let config = ApConfiguration::new(json!({
            "radios": [
                {"band": "2G", "channel": 6},
                {"band": "5G", "channel": 36},
                {"channel": 1}
            ]
        }));

        let radios = config.radio_config_list();
        assert_eq!(radios.len(), 3);
        let bands = ApConfiguration::radio_bands(&radios);
        assert_eq!(bands.into_iter().collect::<Vec<_>>(), vec!["2G", "5G"]);
    }

    #[test]
    fn test_missing_radios_is_empty() {
        let config = ApConfiguration::new(json!({"interfaces": []}));
        assert!(config.radio_config_list().is_empty());
        assert!(ApConfiguration::radio_bands(&[]).is_empty());
    }

    #[test]
    fn test_capabilities_wifi() {
        let caps = DeviceCapabilities::new(json!({"wifi": {"phy0": {}}, "platform": "ap"}));
        assert!(caps.wifi().is_some());

        let caps = DeviceCapabilities::new(json!({"platform": "ap"}));
        assert!(caps.wifi().is_none());
    }
}

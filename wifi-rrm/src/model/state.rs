//! Device state reported by access points.
//!
//! A [`State`] is the latest full snapshot a device published: its radios and
//! the clients associated to each SSID on each interface. State reports are
//! never merged; a new report replaces the previous one wholesale.
//!
//! Devices are not consistent about numeric encoding (`"tx_power": 20` and
//! `"tx_power": "20"` both occur in the field), so numeric fields accept a
//! JSON number or a numeric string. `null` and an absent field are
//! equivalent.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ParseError;

/// Latest state snapshot of one device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Radios, in the order the device reports them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub radios: Vec<Radio>,

    /// Network interfaces.
    #[serde(default, deserialize_with = "null_as_default")]
    pub interfaces: Vec<Interface>,
}

/// Operating parameters of one radio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Radio {
    /// Current transmit power (dBm).
    #[serde(default, deserialize_with = "lenient_i32")]
    pub tx_power: Option<i32>,

    /// Current channel width (MHz).
    #[serde(default, deserialize_with = "lenient_i32")]
    pub channel_width: Option<i32>,

    /// Current primary channel.
    #[serde(default, deserialize_with = "lenient_i32")]
    pub channel: Option<i32>,

    /// PHY name (e.g. `platform/soc/c000000.wifi`).
    #[serde(default)]
    pub phy: Option<String>,
}

/// A network interface and the SSIDs it serves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    /// Interface name (e.g. `up0v0`).
    #[serde(default)]
    pub name: Option<String>,

    /// Served networks.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ssids: Vec<Ssid>,
}

/// A served network and its associated clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ssid {
    /// Network name.
    #[serde(default)]
    pub ssid: Option<String>,

    /// BSSID of this network on the device.
    #[serde(default)]
    pub bssid: Option<String>,

    /// Operating mode (e.g. `ap`).
    #[serde(default)]
    pub mode: Option<String>,

    /// Associated clients.
    #[serde(default, deserialize_with = "null_as_default")]
    pub associations: Vec<Association>,
}

/// A client associated to a served network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Association {
    /// Client MAC address.
    #[serde(default)]
    pub bssid: Option<String>,

    /// Client station address, when reported separately.
    #[serde(default)]
    pub station: Option<String>,

    /// Received signal strength from the client (dBm).
    #[serde(default, deserialize_with = "lenient_i32")]
    pub rssi: Option<i32>,
}

impl State {
    /// Parse a state object (the `state` member of a state record).
    pub fn from_payload(payload: &Value) -> Result<Self, ParseError> {
        Ok(State::deserialize(payload)?)
    }

    /// Returns `true` if the device reports at least one radio.
    pub fn has_radios(&self) -> bool {
        !self.radios.is_empty()
    }

    /// Iterate every client association across all interfaces and SSIDs.
    pub fn associations(&self) -> impl Iterator<Item = (&Ssid, &Association)> {
        self.interfaces
            .iter()
            .flat_map(|iface| iface.ssids.iter())
            .flat_map(|ssid| ssid.associations.iter().map(move |client| (ssid, client)))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        Some(other) => {
            return Err(de::Error::custom(format!(
                "expected integer, found {}",
                other
            )))
        }
    };

    parsed
        .and_then(|v| i32::try_from(v).ok())
        .map(Some)
        .ok_or_else(|| de::Error::custom("invalid integer value"))
}

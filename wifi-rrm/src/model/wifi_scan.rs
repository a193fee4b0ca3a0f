//! Wifi scan results reported by access points.
//!
//! A wifi scan record carries the neighbouring BSSs one device heard during a
//! single scan, under `status.scan` in the record payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ParseError;

/// One neighbouring BSS observed during a scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WifiScanEntry {
    /// BSSID of the neighbour.
    #[serde(default)]
    pub bssid: Option<String>,

    /// SSID of the neighbour, if broadcast.
    #[serde(default)]
    pub ssid: Option<String>,

    /// Primary channel.
    #[serde(default)]
    pub channel: Option<u32>,

    /// Center frequency (MHz).
    #[serde(default)]
    pub frequency: Option<u32>,

    /// Received signal strength (dBm).
    #[serde(default)]
    pub signal: Option<i32>,

    /// Timing synchronization function value.
    #[serde(default)]
    pub tsf: Option<u64>,

    /// Milliseconds since the BSS was last seen.
    #[serde(default)]
    pub last_seen: Option<u64>,

    /// Capability bitmap.
    #[serde(default)]
    pub capability: Option<u32>,

    /// Base64 HT operation element.
    #[serde(default)]
    pub ht_oper: Option<String>,

    /// Base64 VHT operation element.
    #[serde(default)]
    pub vht_oper: Option<String>,
}

/// Parse the scan entries out of a wifi scan record payload.
///
/// Expects `payload.status.scan` to be an array of entry objects. Any shape
/// mismatch rejects the whole record.
pub fn parse_wifi_scan_entries(payload: &Value) -> Result<Vec<WifiScanEntry>, ParseError> {
    let status = payload
        .get("status")
        .filter(|v| v.is_object())
        .ok_or(ParseError::MissingField("status"))?;
    let scan = status
        .get("scan")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingField("status.scan"))?;

    scan.iter()
        .map(|entry| WifiScanEntry::deserialize(entry).map_err(ParseError::from))
        .collect()
}

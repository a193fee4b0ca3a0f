//! Radio band identifiers and per-band channel plans.
//!
//! Bands are identified by the short strings used in device telemetry and
//! radio configuration (`"2G"`, `"5G"`). Optimizers iterate [`BANDS`] and
//! compute assignments for each band independently.

/// 2.4 GHz band.
pub const BAND_2G: &str = "2G";

/// 5 GHz band.
pub const BAND_5G: &str = "5G";

/// All bands the optimizers compute assignments for, in evaluation order.
pub const BANDS: [&str; 2] = [BAND_2G, BAND_5G];

/// Non-overlapping 20 MHz channels in the 2.4 GHz band.
pub const AVAILABLE_CHANNELS_2G: &[u32] = &[1, 6, 11];

/// 20 MHz primary channels in the 5 GHz band (UNII-1 and UNII-3).
pub const AVAILABLE_CHANNELS_5G: &[u32] = &[36, 40, 44, 48, 149, 153, 157, 161, 165];

/// Returns the channels an optimizer may choose from for `band`.
///
/// Unknown bands have no channels.
pub fn available_channels(band: &str) -> &'static [u32] {
    match band {
        BAND_2G => AVAILABLE_CHANNELS_2G,
        BAND_5G => AVAILABLE_CHANNELS_5G,
        _ => &[],
    }
}

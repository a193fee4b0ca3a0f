//! Measurement-based AP-client transmit power control.
//!
//! Each device's power is chosen so that its weakest associated client still
//! reaches the SNR needed for a target MCS. Only the first radio of each
//! device is considered.

use tracing::{debug, info};

use crate::bands::BAND_5G;
use crate::config::TpcParams;
use crate::model::State;
use crate::optimizers::{OptimizerContext, TpcAlgorithm, TpcError, TxPowerMap};

/// Algorithm identifier.
pub const ALGORITHM_ID: &str = "measure_ap_client";

/// Default target MCS index.
pub const DEFAULT_TARGET_MCS: i32 = 8;

/// Power assigned to devices with no associated clients (dBm).
pub const DEFAULT_TX_POWER: i32 = 10;

/// Required SNR (dB) per 802.11ac MCS index.
pub const MCS_TO_SNR: [f64; 10] = [5.0, 7.5, 10.0, 12.5, 15.0, 17.5, 20.0, 22.5, 25.0, 27.5];

/// Assumed channel width when a radio does not report one (MHz).
pub const DEFAULT_CHANNEL_WIDTH_MHZ: i32 = 20;

const BOLTZMANN: f64 = 1.38e-23;
const TEMPERATURE_K: f64 = 290.0;
const NOISE_FLOOR_DB: f64 = 6.0;
const MARGIN_DB: f64 = 2.0;

/// Required transmit power (dBm) before rounding and clamping.
///
/// `SNR(mcs) + current - rssi + 10*log10(k*T*B*1000) + NF - M`, with the
/// bandwidth `B` in Hz. Returns `None` if `mcs` is not in [`MCS_TO_SNR`].
pub fn compute_tx_power(
    mcs: usize,
    current_tx_power: i32,
    client_rssi: i32,
    bandwidth_hz: f64,
) -> Option<f64> {
    let snr = MCS_TO_SNR.get(mcs)?;
    let noise_power = 10.0 * (BOLTZMANN * TEMPERATURE_K * bandwidth_hz * 1000.0).log10();
    Some(
        snr + f64::from(current_tx_power) - f64::from(client_rssi)
            + noise_power
            + NOISE_FLOOR_DB
            - MARGIN_DB,
    )
}

/// Measurement-based AP-client TPC.
#[derive(Debug, Clone)]
pub struct MeasurementBasedApClientTpc {
    context: OptimizerContext,
    min_tx_power: i32,
    max_tx_power: i32,
    target_mcs: usize,
}

impl MeasurementBasedApClientTpc {
    /// Create the algorithm, validating the target MCS and power range.
    pub fn new(context: OptimizerContext, params: &TpcParams) -> Result<Self, TpcError> {
        let target_mcs = usize::try_from(params.target_mcs)
            .ok()
            .filter(|mcs| *mcs < MCS_TO_SNR.len())
            .ok_or(TpcError::InvalidTargetMcs {
                mcs: params.target_mcs,
                table_len: MCS_TO_SNR.len(),
            })?;
        if params.min_tx_power > params.max_tx_power {
            return Err(TpcError::InvalidPowerRange {
                min: params.min_tx_power,
                max: params.max_tx_power,
            });
        }

        Ok(Self {
            context,
            min_tx_power: params.min_tx_power,
            max_tx_power: params.max_tx_power,
            target_mcs,
        })
    }

    /// The validated target MCS index.
    pub fn target_mcs(&self) -> usize {
        self.target_mcs
    }

    /// Power for one device, or `None` if it reports no radios.
    pub fn tx_power_for_state(&self, serial: &str, state: &State) -> Option<i32> {
        let radio = state.radios.first()?;
        let current_tx_power = radio.tx_power.unwrap_or(0);
        let bandwidth_hz =
            f64::from(radio.channel_width.unwrap_or(DEFAULT_CHANNEL_WIDTH_MHZ)) * 1_000_000.0;

        let client_rssi = state
            .associations()
            .filter_map(|(ssid, client)| {
                debug!(
                    device = serial,
                    ssid = ssid.ssid.as_deref().unwrap_or(""),
                    client = client.bssid.as_deref().unwrap_or(""),
                    rssi = ?client.rssi,
                    "Client association"
                );
                client.rssi
            })
            .min();

        let Some(client_rssi) = client_rssi else {
            info!(
                device = serial,
                tx_power = DEFAULT_TX_POWER,
                previous = current_tx_power,
                "No clients, assigning default tx power"
            );
            return Some(DEFAULT_TX_POWER);
        };

        let tx_power = self.select_tx_power(serial, current_tx_power, client_rssi, bandwidth_hz);
        info!(device = serial, tx_power, previous = current_tx_power, "Assigning tx power");
        Some(tx_power)
    }

    /// Walk down from the target MCS until the power fits under the maximum.
    fn select_tx_power(
        &self,
        serial: &str,
        current_tx_power: i32,
        client_rssi: i32,
        bandwidth_hz: f64,
    ) -> i32 {
        for mcs in (0..=self.target_mcs).rev() {
            let Some(computed) = compute_tx_power(mcs, current_tx_power, client_rssi, bandwidth_hz)
            else {
                continue;
            };
            let tx_power = computed.ceil() as i32;
            debug!(
                device = serial,
                mcs,
                current_tx_power,
                rssi = client_rssi,
                bandwidth_hz,
                computed,
                tx_power,
                "Computed tx power"
            );

            if tx_power > self.max_tx_power {
                debug!(device = serial, max = self.max_tx_power, "Above maximum, trying mcs - 1");
                continue;
            }
            if tx_power < self.min_tx_power {
                debug!(device = serial, min = self.min_tx_power, "Below minimum, using minimum");
                return self.min_tx_power;
            }
            return tx_power;
        }

        info!(device = serial, min = self.min_tx_power, "Already at lowest MCS, using minimum");
        self.min_tx_power
    }
}

impl TpcAlgorithm for MeasurementBasedApClientTpc {
    fn algorithm_id(&self) -> &'static str {
        ALGORITHM_ID
    }

    fn compute_tx_power_map(&self) -> TxPowerMap {
        let mut tx_power_map = TxPowerMap::new();
        for (serial, state) in self.context.zone_states() {
            let Some(tx_power) = self.tx_power_for_state(&serial, &state) else {
                debug!(device = %serial, "No radios found, skipping");
                continue;
            };
            tx_power_map
                .entry(serial)
                .or_default()
                .insert(BAND_5G.to_string(), tx_power);
        }
        tx_power_map
    }
}

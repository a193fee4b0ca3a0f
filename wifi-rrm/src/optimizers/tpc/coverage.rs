//! Coverage models for the location-based optimizer.
//!
//! A [`CoverageModel`] scores one candidate power assignment for a set of
//! access points at known floor-plan positions. Lower is better.

use std::sync::Arc;

/// Default receive sensitivity threshold (dBm) for a covered point.
pub const DEFAULT_RX_THRESHOLD_DBM: f64 = -80.0;

/// Default minimum SINR (dB) for a well-served point.
pub const DEFAULT_SINR_THRESHOLD_DB: f64 = 10.0;

/// Default carrier frequency (Hz) used for path loss.
pub const DEFAULT_FREQUENCY_HZ: f64 = 5.0e9;

/// Default channel width (Hz) used for thermal noise.
pub const DEFAULT_NOISE_BANDWIDTH_HZ: f64 = 20.0e6;

const SPEED_OF_LIGHT: f64 = 299_792_458.0;
const BOLTZMANN: f64 = 1.38e-23;
const TEMPERATURE_K: f64 = 290.0;

/// One candidate assignment to score.
#[derive(Debug, Clone, Copy)]
pub struct CoverageInput<'a> {
    /// Side length of the square sample grid.
    pub boundary: u32,
    /// Access point positions `(x, y)`.
    pub locations: &'a [(f64, f64)],
    /// Candidate transmit power (dBm) per access point, in slot order.
    pub tx_powers: &'a [i32],
}

/// Scores a candidate power assignment.
pub trait CoverageModel: Send + Sync {
    /// The metric for `input`. Lower is better.
    fn metric(&self, input: &CoverageInput<'_>) -> f64;
}

impl<M: CoverageModel + ?Sized> CoverageModel for Arc<M> {
    fn metric(&self, input: &CoverageInput<'_>) -> f64 {
        (**self).metric(input)
    }
}

/// Free-space propagation over a square grid.
///
/// For every grid point the strongest access point is the serving signal and
/// every other access point is interference. The metric adds the fraction of
/// points below the receive threshold to the fraction of covered points whose
/// SINR is below the SINR threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeSpaceCoverageModel {
    /// Minimum received power (dBm) for a point to count as covered.
    pub rx_threshold_dbm: f64,
    /// Minimum SINR (dB) for a covered point to count as well served.
    pub sinr_threshold_db: f64,
    /// Carrier frequency (Hz).
    pub frequency_hz: f64,
    /// Noise bandwidth (Hz).
    pub noise_bandwidth_hz: f64,
}

impl Default for FreeSpaceCoverageModel {
    fn default() -> Self {
        Self {
            rx_threshold_dbm: DEFAULT_RX_THRESHOLD_DBM,
            sinr_threshold_db: DEFAULT_SINR_THRESHOLD_DB,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            noise_bandwidth_hz: DEFAULT_NOISE_BANDWIDTH_HZ,
        }
    }
}

impl FreeSpaceCoverageModel {
    /// Free-space path loss (dB) over `distance_m`, clamped to at least 1 m.
    pub fn path_loss_db(&self, distance_m: f64) -> f64 {
        let distance_m = distance_m.max(1.0);
        let ratio = 4.0 * std::f64::consts::PI * distance_m * self.frequency_hz / SPEED_OF_LIGHT;
        20.0 * ratio.log10()
    }

    fn noise_mw(&self) -> f64 {
        BOLTZMANN * TEMPERATURE_K * self.noise_bandwidth_hz * 1000.0
    }
}

fn dbm_to_mw(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0)
}

impl CoverageModel for FreeSpaceCoverageModel {
    fn metric(&self, input: &CoverageInput<'_>) -> f64 {
        let points = u64::from(input.boundary) * u64::from(input.boundary);
        if points == 0 || input.locations.is_empty() {
            return 0.0;
        }

        let noise_mw = self.noise_mw();
        let mut uncovered = 0u64;
        let mut covered = 0u64;
        let mut interfered = 0u64;
        let mut rx_mw = vec![0.0; input.locations.len()];

        for x in 0..input.boundary {
            for y in 0..input.boundary {
                let (px, py) = (f64::from(x), f64::from(y));
                let aps = input.locations.iter().zip(input.tx_powers);
                for (slot, ((ax, ay), tx)) in aps.enumerate() {
                    let distance = (px - ax).hypot(py - ay);
                    rx_mw[slot] = dbm_to_mw(f64::from(*tx) - self.path_loss_db(distance));
                }

                let strongest = rx_mw.iter().copied().fold(0.0, f64::max);
                let total: f64 = rx_mw.iter().sum();
                if 10.0 * strongest.log10() < self.rx_threshold_dbm {
                    uncovered += 1;
                    continue;
                }

                covered += 1;
                let sinr_db = 10.0 * (strongest / (total - strongest + noise_mw)).log10();
                if sinr_db < self.sinr_threshold_db {
                    interfered += 1;
                }
            }
        }

        let uncovered_ratio = uncovered as f64 / points as f64;
        let interfered_ratio = if covered == 0 {
            0.0
        } else {
            interfered as f64 / covered as f64
        };
        uncovered_ratio + interfered_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(locations: &[(f64, f64)], tx_powers: &[i32], boundary: u32) -> f64 {
        FreeSpaceCoverageModel::default().metric(&CoverageInput {
            boundary,
            locations,
            tx_powers,
        })
    }

    #[test]
    fn test_path_loss_is_clamped_below_one_metre() {
        let model = FreeSpaceCoverageModel::default();
        assert_eq!(model.path_loss_db(0.0), model.path_loss_db(1.0));
        assert!((model.path_loss_db(1.0) - 46.4).abs() < 0.1);
        assert!(model.path_loss_db(10.0) > model.path_loss_db(1.0));
    }

    #[test]
    fn test_more_power_covers_more() {
        let locations = [(10.0, 10.0)];
        let weak = metric(&locations, &[0], 50);
        let strong = metric(&locations, &[30], 50);
        assert!(strong < weak);
    }

    #[test]
    fn test_metric_is_bounded() {
        let value = metric(&[(0.0, 0.0), (1.0, 1.0)], &[30, 30], 20);
        assert!((0.0..=2.0).contains(&value));
    }

    #[test]
    fn test_empty_grid_scores_zero() {
        assert_eq!(metric(&[(0.0, 0.0)], &[10], 0), 0.0);
    }
}

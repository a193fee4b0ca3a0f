//! Location-based optimal transmit power control.
//!
//! For each band, every combination of allowed powers across the zone's
//! located access points is scored with a [`CoverageModel`] and the best one
//! is assigned. The search is exhaustive, so it is capped at
//! [`MAX_COMBINATIONS`].

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, error, info};

use super::coverage::{CoverageInput, CoverageModel, FreeSpaceCoverageModel};
use super::permutations::{combination_at, combination_count};
use crate::bands::BANDS;
use crate::config::TpcParams;
use crate::optimizers::{OptimizerContext, TpcAlgorithm, TxPowerMap};

/// Algorithm identifier.
pub const ALGORITHM_ID: &str = "location_optimal";

/// Smallest search boundary, used unless a device declares a larger one.
pub const DEFAULT_BOUNDARY: i32 = 100;

/// Upper limit on the number of combinations evaluated per band.
pub const MAX_COMBINATIONS: usize = 1000;

/// Power assigned to every device when no combination could be scored (dBm).
pub const FALLBACK_TX_POWER: i32 = 30;

/// Find the best power per access point.
///
/// Evaluates every combination of `choices` across `locations` on the rayon
/// pool and returns the one with the lowest metric, the earliest in
/// enumeration order on ties. Returns [`FALLBACK_TX_POWER`] for every access
/// point if nothing scored below infinity.
pub fn run_location_based_optimal_tpc<M>(
    coverage: &M,
    boundary: u32,
    locations: &[(f64, f64)],
    choices: &[i32],
) -> Vec<i32>
where
    M: CoverageModel + ?Sized,
{
    let n = locations.len();
    let total = combination_count(choices.len(), n).unwrap_or(0);
    info!(combinations = total, "Evaluating tx power combinations");

    let (best_metric, best_index) = (0..total)
        .into_par_iter()
        .map(|index| {
            let tx_powers = combination_at(choices, n, index);
            let metric = coverage.metric(&CoverageInput {
                boundary,
                locations,
                tx_powers: &tx_powers,
            });
            (if metric.is_nan() { f64::INFINITY } else { metric }, index)
        })
        .reduce(
            || (f64::INFINITY, usize::MAX),
            |a, b| if (b.0, b.1) < (a.0, a.1) { b } else { a },
        );

    if best_metric < f64::INFINITY {
        debug!(index = best_index, metric = best_metric, "Selected tx power combination");
        combination_at(choices, n, best_index)
    } else {
        vec![FALLBACK_TX_POWER; n]
    }
}

/// Location-based exhaustive TPC.
#[derive(Debug, Clone)]
pub struct LocationBasedOptimalTpc<M = FreeSpaceCoverageModel> {
    context: OptimizerContext,
    min_tx_power: i32,
    max_tx_power: i32,
    coverage: M,
}

impl LocationBasedOptimalTpc {
    /// Create the algorithm with the free-space coverage model.
    pub fn new(context: OptimizerContext, params: &TpcParams) -> Self {
        Self::with_coverage_model(context, params, FreeSpaceCoverageModel::default())
    }
}

impl<M: CoverageModel> LocationBasedOptimalTpc<M> {
    /// Create the algorithm with a custom coverage model.
    pub fn with_coverage_model(context: OptimizerContext, params: &TpcParams, coverage: M) -> Self {
        Self {
            context,
            min_tx_power: params.min_tx_power,
            max_tx_power: params.max_tx_power,
            coverage,
        }
    }

    /// Compute assignments for one band and merge them into `tx_power_map`.
    ///
    /// Leaves the map untouched if the band cannot be searched.
    fn build_tx_power_map_for_band(&self, band: &str, tx_power_map: &mut TxPowerMap) {
        let mut slots: BTreeMap<String, usize> = BTreeMap::new();
        let mut locations: Vec<(f64, f64)> = Vec::new();
        let mut choices: Vec<i32> = (self.min_tx_power..=self.max_tx_power).collect();
        let mut boundary = DEFAULT_BOUNDARY;

        for (serial, state) in self.context.zone_states() {
            if !state.has_radios() {
                debug!(device = %serial, "No radios found, skipping");
                continue;
            }
            let Some(config) = self.context.device_config(&serial) else {
                continue;
            };
            let Some(location) = config.location.as_deref() else {
                debug!(device = %serial, "No location data, skipping");
                continue;
            };
            let &[x, y] = location else {
                error!(device = %serial, location = ?location, "Location is not 2-D, skipping");
                continue;
            };
            if x < 0 || y < 0 {
                error!(device = %serial, location = ?location, "Location is negative, skipping");
                continue;
            }

            slots.insert(serial.clone(), locations.len());
            locations.push((f64::from(x), f64::from(y)));

            if let Some(allowed) = config.allowed_tx_powers_for(band) {
                choices.retain(|power| allowed.contains(power));
            }
            if let Some(device_boundary) = config.boundary {
                boundary = boundary.max(device_boundary);
            }
        }

        if locations.is_empty() {
            error!(band, "No valid APs, missing location data or inactive APs");
            return;
        }

        let max_coordinate = locations
            .iter()
            .map(|(x, y)| x.max(*y) as i32)
            .max()
            .unwrap_or(0);
        if max_coordinate > boundary {
            error!(band, boundary, max_coordinate, "Invalid boundary");
            return;
        }

        if choices.is_empty() {
            error!(band, "Invalid tx power choices, none left after intersection");
            return;
        }

        match combination_count(choices.len(), locations.len()) {
            Some(count) if count <= MAX_COMBINATIONS => {}
            count => {
                error!(
                    band,
                    combinations = ?count,
                    max = MAX_COMBINATIONS,
                    "Too many tx power combinations"
                );
                return;
            }
        }

        let boundary = u32::try_from(boundary).unwrap_or(0);
        let tx_powers =
            run_location_based_optimal_tpc(&self.coverage, boundary, &locations, &choices);

        for (serial, slot) in slots {
            let tx_power = tx_powers[slot];
            info!(device = %serial, band, tx_power, "Assigning tx power");
            tx_power_map
                .entry(serial)
                .or_default()
                .insert(band.to_string(), tx_power);
        }
    }
}

impl<M: CoverageModel> TpcAlgorithm for LocationBasedOptimalTpc<M> {
    fn algorithm_id(&self) -> &'static str {
        ALGORITHM_ID
    }

    fn compute_tx_power_map(&self) -> TxPowerMap {
        let mut tx_power_map = TxPowerMap::new();
        for band in BANDS {
            self.build_tx_power_map_for_band(band, &mut tx_power_map);
        }
        tx_power_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceConfig, DeviceRegistry};
    use crate::model::{DataModel, Radio, State};
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Scores a combination by its distance from a preferred assignment and
    /// records every combination it saw.
    struct PreferenceModel {
        preferred: Vec<i32>,
        seen: Mutex<Vec<Vec<i32>>>,
    }

    impl PreferenceModel {
        fn new(preferred: Vec<i32>) -> Self {
            Self {
                preferred,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl CoverageModel for PreferenceModel {
        fn metric(&self, input: &CoverageInput<'_>) -> f64 {
            self.seen.lock().push(input.tx_powers.to_vec());
            input
                .tx_powers
                .iter()
                .zip(&self.preferred)
                .map(|(a, b)| f64::from((a - b).abs()))
                .sum()
        }
    }

    /// Every combination scores the same.
    struct FlatModel(f64);

    impl CoverageModel for FlatModel {
        fn metric(&self, _input: &CoverageInput<'_>) -> f64 {
            self.0
        }
    }

    /// Looks metrics up by combination.
    struct TableModel(HashMap<Vec<i32>, f64>);

    impl CoverageModel for TableModel {
        fn metric(&self, input: &CoverageInput<'_>) -> f64 {
            self.0.get(input.tx_powers).copied().unwrap_or(f64::INFINITY)
        }
    }

    const TWO_APS: [(f64, f64); 2] = [(0.0, 0.0), (1.0, 1.0)];

    fn radio_state() -> State {
        State {
            radios: vec![Radio::default()],
            interfaces: vec![],
        }
    }

    fn context(devices: &[(&str, DeviceConfig)]) -> OptimizerContext {
        let model = DataModel::new();
        let registry = DeviceRegistry::new();
        for (serial, config) in devices {
            model.states().insert(*serial, radio_state());
            registry.set_device_config(*serial, config.clone());
            registry.add_to_zone("zone", *serial);
        }
        OptimizerContext::new(Arc::new(model), "zone", &registry)
    }

    fn located(x: i32, y: i32) -> DeviceConfig {
        DeviceConfig::enabled().with_location(x, y)
    }

    // =========================================================================
    // Search
    // =========================================================================

    mod search {
        use super::*;

        #[test]
        fn test_two_devices_two_choices_enumerates_four() {
            let model = PreferenceModel::new(vec![20, 10]);
            let result = run_location_based_optimal_tpc(&model, 100, &TWO_APS, &[10, 20]);

            assert_eq!(result, vec![20, 10]);
            let mut seen = model.seen.lock().clone();
            seen.sort();
            assert_eq!(seen, vec![vec![10, 10], vec![10, 20], vec![20, 10], vec![20, 20]]);
        }

        #[test]
        fn test_ties_pick_first_in_enumeration_order() {
            let result = run_location_based_optimal_tpc(&FlatModel(0.5), 100, &TWO_APS, &[10, 20]);
            assert_eq!(result, vec![10, 10]);
        }

        #[test]
        fn test_nothing_scored_falls_back() {
            let unscored = FlatModel(f64::INFINITY);
            let result = run_location_based_optimal_tpc(&unscored, 100, &TWO_APS, &[10, 20]);
            assert_eq!(result, vec![FALLBACK_TX_POWER, FALLBACK_TX_POWER]);

            let result =
                run_location_based_optimal_tpc(&FlatModel(f64::NAN), 100, &[(0.0, 0.0)], &[10, 20]);
            assert_eq!(result, vec![FALLBACK_TX_POWER]);
        }

        #[test]
        fn test_empty_choices_falls_back() {
            let result = run_location_based_optimal_tpc(&FlatModel(0.0), 100, &[(0.0, 0.0)], &[]);
            assert_eq!(result, vec![FALLBACK_TX_POWER]);
        }
    }

    // =========================================================================
    // Band preparation
    // =========================================================================

    mod band_search {
        use super::*;

        fn run(devices: &[(&str, DeviceConfig)], params: &TpcParams) -> TxPowerMap {
            LocationBasedOptimalTpc::with_coverage_model(context(devices), params, FlatModel(1.0))
                .compute_tx_power_map()
        }

        fn narrow() -> TpcParams {
            TpcParams::default().with_tx_power_range(10, 11)
        }

        #[test]
        fn test_assigns_both_bands() {
            let map = run(&[("a", located(0, 0)), ("b", located(1, 1))], &narrow());
            assert_eq!(map.len(), 2);
            assert_eq!(map["a"].get("2G"), Some(&10));
            assert_eq!(map["a"].get("5G"), Some(&10));
            assert_eq!(map["b"].get("5G"), Some(&10));
        }

        #[test]
        fn test_allow_lists_intersect_across_devices() {
            let devices = [
                ("a", located(0, 0).with_allowed_tx_powers("5G", vec![5, 11, 20])),
                ("b", located(1, 1).with_allowed_tx_powers("5G", vec![11, 20])),
            ];
            let map = run(&devices, &TpcParams::default().with_tx_power_range(0, 15));
            assert_eq!(map["a"]["5G"], 11);
            assert_eq!(map["b"]["5G"], 11);
            assert_eq!(map["a"]["2G"], 0);
        }

        #[test]
        fn test_empty_intersection_skips_band() {
            let devices = [
                ("a", located(0, 0).with_allowed_tx_powers("2G", vec![5])),
                ("b", located(1, 1).with_allowed_tx_powers("2G", vec![6])),
            ];
            let map = run(&devices, &TpcParams::default().with_tx_power_range(0, 10));
            assert!(map["a"].get("2G").is_none());
            assert!(map["a"].get("5G").is_some());
        }

        #[test]
        fn test_invalid_locations_are_excluded() {
            let mut three_d = DeviceConfig::enabled();
            three_d.location = Some(vec![1, 2, 3]);
            let devices = [
                ("good", located(5, 5)),
                ("negative", located(-1, 5)),
                ("unlocated", DeviceConfig::enabled()),
                ("three-d", three_d),
            ];
            let map = run(&devices, &narrow());
            assert_eq!(map.keys().collect::<Vec<_>>(), vec!["good"]);
        }

        #[test]
        fn test_no_valid_devices_gives_empty_map() {
            assert!(run(&[("a", DeviceConfig::enabled())], &narrow()).is_empty());
        }

        #[test]
        fn test_device_without_radios_is_excluded() {
            let model = DataModel::new();
            let registry = DeviceRegistry::new();
            model.states().insert("a", State::default());
            registry.set_device_config("a", located(1, 1));
            registry.add_to_zone("zone", "a");
            let context = OptimizerContext::new(Arc::new(model), "zone", &registry);

            let map =
                LocationBasedOptimalTpc::with_coverage_model(context, &narrow(), FlatModel(1.0))
                    .compute_tx_power_map();
            assert!(map.is_empty());
        }

        #[test]
        fn test_location_beyond_boundary_aborts() {
            let map = run(&[("a", located(0, 0)), ("b", located(101, 5))], &narrow());
            assert!(map.is_empty());
        }

        #[test]
        fn test_device_boundary_extends_search_area() {
            let map = run(
                &[("a", located(0, 0)), ("b", located(150, 5).with_boundary(200))],
                &narrow(),
            );
            assert_eq!(map.len(), 2);
        }

        #[test]
        fn test_too_many_combinations_aborts() {
            // 31 choices ^ 3 devices = 29791 > 1000
            let devices = [("a", located(0, 0)), ("b", located(1, 1)), ("c", located(2, 2))];
            assert!(run(&devices, &TpcParams::default()).is_empty());
        }

        #[test]
        fn test_ceiling_is_inclusive() {
            // 10 choices ^ 3 devices = 1000
            let devices = [("a", located(0, 0)), ("b", located(1, 1)), ("c", located(2, 2))];
            let map = run(&devices, &TpcParams::default().with_tx_power_range(0, 9));
            assert_eq!(map.len(), 3);
        }

        #[test]
        fn test_results_keep_slot_per_serial() {
            let devices = [("b", located(1, 1)), ("a", located(0, 0))];
            // Slots follow serial order: a -> 0, b -> 1.
            let context = context(&devices);
            let map = LocationBasedOptimalTpc::with_coverage_model(
                context,
                &narrow(),
                PreferenceModel::new(vec![10, 11]),
            )
            .compute_tx_power_map();
            assert_eq!(map["a"]["5G"], 10);
            assert_eq!(map["b"]["5G"], 11);
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    proptest! {
        #[test]
        fn prop_selected_combination_is_global_minimum(
            metrics in prop::collection::vec(0u8..5, 9),
        ) {
            let choices = [10, 20, 30];
            let table: HashMap<Vec<i32>, f64> = (0..9)
                .map(|index| (combination_at(&choices, 2, index), f64::from(metrics[index])))
                .collect();
            let model = TableModel(table.clone());

            let result = run_location_based_optimal_tpc(&model, 100, &TWO_APS, &choices);
            let best = table[&result];
            prop_assert!(table.values().all(|metric| best <= *metric));

            let first_best = (0..9).find(|index| f64::from(metrics[*index]) == best).unwrap();
            prop_assert_eq!(result, combination_at(&choices, 2, first_best));
        }
    }
}

//! Transmit power control algorithms.

pub mod coverage;
pub mod location;
pub mod measurement;
pub mod permutations;

pub use coverage::{CoverageInput, CoverageModel, FreeSpaceCoverageModel};
pub use location::{run_location_based_optimal_tpc, LocationBasedOptimalTpc};
pub use measurement::MeasurementBasedApClientTpc;
pub use permutations::permutations_with_repetition;

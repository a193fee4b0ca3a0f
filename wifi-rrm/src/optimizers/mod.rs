//! Radio resource optimizers.
//!
//! Optimizers read the shared [`DataModel`](crate::model::DataModel) through an
//! [`OptimizerContext`] and produce per-device, per-band assignments. They do
//! not touch devices themselves: [`apply_tx_power_map`] hands a result to a
//! [`TxPowerApplier`].
//!
//! # Architecture
//!
//! ```text
//! DataModel + zone configs ──► OptimizerContext ─┬► TpcAlgorithm ─────► TxPowerMap
//!                                                │                          │
//!                                                │                          ▼
//!                                                │                   TxPowerApplier
//!                                                └► ChannelOptimizer ─► ChannelMap
//! ```

pub mod channel;
pub mod tpc;

mod context;
mod error;

use std::collections::BTreeMap;

use tracing::info;

use crate::device::TxPowerApplier;

pub use context::OptimizerContext;
pub use error::TpcError;

/// Device serial -> band -> transmit power (dBm).
pub type TxPowerMap = BTreeMap<String, BTreeMap<String, i32>>;

/// Device serial -> band -> channel number.
pub type ChannelMap = BTreeMap<String, BTreeMap<String, u32>>;

/// A transmit power control algorithm.
pub trait TpcAlgorithm: Send + Sync {
    /// Stable identifier of the algorithm.
    fn algorithm_id(&self) -> &'static str;

    /// Compute new transmit powers for the participating devices.
    fn compute_tx_power_map(&self) -> TxPowerMap;
}

/// A channel assignment algorithm.
pub trait ChannelOptimizer: Send + Sync {
    /// Stable identifier of the algorithm.
    fn algorithm_id(&self) -> &'static str;

    /// Compute new channels for the participating devices.
    fn compute_channel_map(&self) -> ChannelMap;
}

/// Run `algorithm` and apply its result through `applier`.
///
/// Returns the applied map. An empty result is not applied.
pub fn apply_tx_power_map(
    algorithm: &dyn TpcAlgorithm,
    applier: &dyn TxPowerApplier,
) -> TxPowerMap {
    let tx_power_map = algorithm.compute_tx_power_map();
    if tx_power_map.is_empty() {
        info!(algorithm = algorithm.algorithm_id(), "No tx power changes to apply");
        return tx_power_map;
    }

    info!(
        algorithm = algorithm.algorithm_id(),
        devices = tx_power_map.len(),
        "Applying tx power map"
    );
    applier.apply_tx_powers(&tx_power_map);
    tx_power_map
}

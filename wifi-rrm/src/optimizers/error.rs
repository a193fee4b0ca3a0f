//! Optimizer construction errors.

use thiserror::Error;

/// Invalid optimizer parameters, reported at construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TpcError {
    /// The target MCS index is outside the SNR table.
    #[error("invalid target MCS {mcs}: must be in 0..{table_len}")]
    InvalidTargetMcs { mcs: i32, table_len: usize },

    /// The minimum transmit power exceeds the maximum.
    #[error("invalid tx power range: min {min} dBm > max {max} dBm")]
    InvalidPowerRange { min: i32, max: i32 },
}

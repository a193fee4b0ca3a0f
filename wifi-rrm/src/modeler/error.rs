//! Modeler errors.

use thiserror::Error;

/// Reasons the modeler task stopped abnormally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelerError {
    /// Every telemetry producer was dropped; no more input can arrive.
    #[error("modeler input queue closed")]
    QueueClosed,
}

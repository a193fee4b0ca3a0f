//! Modeler input queue.
//!
//! Telemetry listeners run on broker threads and must never block, so
//! [`QueueingTelemetryListener`] hands batches to the modeler task through a
//! bounded channel with `try_send`.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

use crate::gateway::{TelemetryListener, TelemetryRecord};
use crate::telemetry::ModelerMetrics;

/// Kind of records in an input batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDataType {
    /// Device state records.
    State,
    /// Wifi scan records.
    WifiScan,
}

/// One batch of telemetry records of a single kind.
#[derive(Debug, Clone)]
pub struct InputData {
    /// Record kind.
    pub kind: InputDataType,
    /// Records in arrival order.
    pub records: Vec<TelemetryRecord>,
}

impl InputData {
    /// Create a batch.
    pub fn new(kind: InputDataType, records: Vec<TelemetryRecord>) -> Self {
        Self { kind, records }
    }
}

/// Telemetry listener that enqueues batches for the modeler task.
pub struct QueueingTelemetryListener {
    input_tx: mpsc::Sender<InputData>,
    metrics: Arc<ModelerMetrics>,
}

impl QueueingTelemetryListener {
    /// Create a listener feeding `input_tx`.
    pub fn new(input_tx: mpsc::Sender<InputData>, metrics: Arc<ModelerMetrics>) -> Self {
        Self { input_tx, metrics }
    }

    fn enqueue(&self, kind: InputDataType, records: Vec<TelemetryRecord>) {
        match self.input_tx.try_send(InputData::new(kind, records)) {
            Ok(()) => self.metrics.batch_received(),
            Err(TrySendError::Full(input)) => {
                warn!(
                    kind = ?input.kind,
                    records = input.records.len(),
                    "Modeler input queue full, rejecting batch"
                );
                self.metrics.batch_rejected();
            }
            Err(TrySendError::Closed(input)) => {
                warn!(
                    kind = ?input.kind,
                    records = input.records.len(),
                    "Modeler is not running, dropping batch"
                );
                self.metrics.batch_rejected();
            }
        }
    }
}

impl TelemetryListener for QueueingTelemetryListener {
    fn handle_state_records(&self, records: Vec<TelemetryRecord>) {
        self.enqueue(InputDataType::State, records);
    }

    fn handle_wifi_scan_records(&self, records: Vec<TelemetryRecord>) {
        self.enqueue(InputDataType::WifiScan, records);
    }
}

//! Point-in-time view of the modeler counters.

use std::fmt;

/// Copy of [`super::ModelerMetrics`] at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelerMetricsSnapshot {
    /// Batches enqueued by telemetry listeners.
    pub batches_received: u64,
    /// Batches rejected because the queue was full or closed.
    pub batches_rejected: u64,
    /// Batches fully processed by the modeler.
    pub batches_processed: u64,
    /// Records dropped for non-RRM-enabled devices.
    pub records_dropped: u64,
    /// Device states installed from the stream.
    pub state_updates: u64,
    /// Wifi scan batches appended.
    pub wifi_scans_appended: u64,
    /// Record payloads that failed to parse.
    pub parse_failures: u64,
    /// Device states installed by the initial backfill.
    pub devices_backfilled: u64,
}

impl ModelerMetricsSnapshot {
    /// Batches enqueued but not yet processed.
    pub fn pending_batches(&self) -> u64 {
        self.batches_received.saturating_sub(self.batches_processed)
    }
}

impl fmt::Display for ModelerMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batches: {} received, {} processed, {} pending, {} rejected; \
             records: {} dropped, {} unparseable; {} states, {} scans, {} backfilled",
            self.batches_received,
            self.batches_processed,
            self.pending_batches(),
            self.batches_rejected,
            self.records_dropped,
            self.parse_failures,
            self.state_updates,
            self.wifi_scans_appended,
            self.devices_backfilled
        )
    }
}

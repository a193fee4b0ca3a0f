//! Atomic counters for the modeler.

use std::sync::atomic::{AtomicU64, Ordering};

use super::ModelerMetricsSnapshot;

/// Counters describing telemetry ingestion.
///
/// All methods take `&self` and may be called from any thread.
#[derive(Debug, Default)]
pub struct ModelerMetrics {
    batches_received: AtomicU64,
    batches_rejected: AtomicU64,
    batches_processed: AtomicU64,
    records_dropped: AtomicU64,
    state_updates: AtomicU64,
    wifi_scans_appended: AtomicU64,
    parse_failures: AtomicU64,
    devices_backfilled: AtomicU64,
}

impl ModelerMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A batch was enqueued for the modeler.
    pub fn batch_received(&self) {
        self.batches_received.fetch_add(1, Ordering::Relaxed);
    }

    /// A batch could not be enqueued (queue full or modeler gone).
    pub fn batch_rejected(&self) {
        self.batches_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// The modeler finished processing a batch.
    pub fn batch_processed(&self) {
        self.batches_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records were dropped because their device is not RRM-enabled.
    pub fn records_dropped(&self, count: u64) {
        self.records_dropped.fetch_add(count, Ordering::Relaxed);
    }

    /// A device state was installed.
    pub fn state_updated(&self) {
        self.state_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// A wifi scan batch was appended to a device history.
    pub fn wifi_scan_appended(&self) {
        self.wifi_scans_appended.fetch_add(1, Ordering::Relaxed);
    }

    /// A record payload failed to parse.
    pub fn parse_failed(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A device state was installed by the initial backfill.
    pub fn device_backfilled(&self) {
        self.devices_backfilled.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> ModelerMetricsSnapshot {
        ModelerMetricsSnapshot {
            batches_received: self.batches_received.load(Ordering::Relaxed),
            batches_rejected: self.batches_rejected.load(Ordering::Relaxed),
            batches_processed: self.batches_processed.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
            state_updates: self.state_updates.load(Ordering::Relaxed),
            wifi_scans_appended: self.wifi_scans_appended.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            devices_backfilled: self.devices_backfilled.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters_start_at_zero() {
        assert_eq!(ModelerMetrics::new().snapshot(), ModelerMetricsSnapshot::default());
    }

    #[test]
    fn test_counters_accumulate_across_threads() {
        let metrics = Arc::new(ModelerMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        metrics.batch_received();
                        metrics.records_dropped(2);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches_received, 400);
        assert_eq!(snapshot.records_dropped, 800);
    }
}

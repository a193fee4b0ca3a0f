//! Modeler telemetry for observability.
//!
//! This module provides counters for the telemetry ingestion pipeline. It uses
//! lock-free atomic counters so producers on broker threads and the modeler
//! task can record events without contention.
//!
//! # Architecture
//!
//! ```text
//! Listeners / Modeler ─────► ModelerMetrics ─────► ModelerMetricsSnapshot ─────► Logs, status
//!                            (atomic counters)     (point-in-time copy)
//! ```
//!
//! # Example
//!
//! ```
//! use wifi_rrm::telemetry::ModelerMetrics;
//!
//! let metrics = ModelerMetrics::new();
//! metrics.batch_received();
//! metrics.records_dropped(3);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.batches_received, 1);
//! assert_eq!(snapshot.records_dropped, 3);
//! ```

mod metrics;
mod snapshot;

pub use metrics::ModelerMetrics;
pub use snapshot::ModelerMetricsSnapshot;

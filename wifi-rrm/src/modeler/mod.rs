//! Telemetry modeler.
//!
//! The modeler maintains the shared [`DataModel`](crate::model::DataModel)
//! from device telemetry. Telemetry listeners run on broker threads and only
//! enqueue; a single tokio task drains the queue and writes the model.
//! Capability and configuration hooks write their maps directly on the
//! notifying thread.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                              Modeler                              │
//! │                                                                   │
//! │  TelemetrySource ──► QueueingTelemetryListener ──► mpsc (bounded) │
//! │                                                        │          │
//! │                                                        ▼          │
//! │  GatewayClient ──► initial backfill ──────────► ┌────────────┐    │
//! │                                                 │ run() loop │    │
//! │                                                 └─────┬──────┘    │
//! │                                                       ▼           │
//! │  Capability/ConfigSource ──► ModelUpdater ──────►  DataModel      │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use wifi_rrm::modeler::{ListenerSources, Modeler};
//!
//! let hub = Arc::new(ListenerHub::new());
//! let modeler = Modeler::new(params, registry, client, &ListenerSources::from_hub(&hub));
//! let handle = modeler.handle();
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(modeler.run(shutdown.clone()));
//!
//! // Broker threads publish into the hub; optimizers read handle.data_model().
//! ```

mod daemon;
mod error;
mod hooks;
mod input;

pub use daemon::{ListenerSources, Modeler, ModelerHandle, ModelerState, MODELER_LISTENER_ID};
pub use error::ModelerError;
pub use hooks::ModelUpdater;
pub use input::{InputData, InputDataType, QueueingTelemetryListener};

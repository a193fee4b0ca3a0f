//! The modeler task.
//!
//! [`Modeler`] owns the receiving end of the input queue and keeps the shared
//! [`DataModel`] up to date. It backfills device state once at startup, then
//! applies queued telemetry batches until shutdown.

use std::fmt;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::{InputData, InputDataType, ModelUpdater, ModelerError, QueueingTelemetryListener};
use crate::config::ModelerParams;
use crate::device::DeviceConfigLookup;
use crate::gateway::{
    CapabilitySource, ConfigSource, GatewayClient, ListenerHub, StatisticsRecords,
    TelemetryRecord, TelemetrySource,
};
use crate::model::{parse_wifi_scan_entries, DataModel, RevalidationReport, State};
use crate::telemetry::{ModelerMetrics, ModelerMetricsSnapshot};

/// Id under which the modeler registers its listeners.
pub const MODELER_LISTENER_ID: &str = "Modeler";

// =============================================================================
// Lifecycle
// =============================================================================

/// Lifecycle of the modeler task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelerState {
    /// Constructed, `run` not yet called.
    Starting,
    /// Backfilling device state from the gateway.
    FetchingInitial,
    /// Consuming the input queue.
    Running,
    /// Stopped; never restarts.
    Terminated,
}

/// Notification sources the modeler subscribes to at construction.
#[derive(Clone, Default)]
pub struct ListenerSources {
    telemetry: Vec<Arc<dyn TelemetrySource>>,
    capability: Vec<Arc<dyn CapabilitySource>>,
    config: Vec<Arc<dyn ConfigSource>>,
}

impl ListenerSources {
    /// No sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one hub for all three kinds of notification.
    pub fn from_hub(hub: &Arc<ListenerHub>) -> Self {
        Self::new()
            .with_telemetry(hub.clone())
            .with_capability(hub.clone())
            .with_config(hub.clone())
    }

    /// Add a telemetry source.
    pub fn with_telemetry(mut self, source: Arc<dyn TelemetrySource>) -> Self {
        self.telemetry.push(source);
        self
    }

    /// Add a capability source.
    pub fn with_capability(mut self, source: Arc<dyn CapabilitySource>) -> Self {
        self.capability.push(source);
        self
    }

    /// Add a configuration source.
    pub fn with_config(mut self, source: Arc<dyn ConfigSource>) -> Self {
        self.config.push(source);
        self
    }
}

// =============================================================================
// Ingestion
// =============================================================================

/// Applies telemetry to the model. Shared by backfill and the main loop.
struct Ingest {
    params: ModelerParams,
    data_model: Arc<DataModel>,
    devices: Arc<dyn DeviceConfigLookup>,
    metrics: Arc<ModelerMetrics>,
}

impl Ingest {
    async fn fetch_initial_data(&self, client: &dyn GatewayClient) {
        let Some(devices) = client.list_devices().await else {
            error!("Failed to fetch device list for initial data");
            return;
        };

        let serials: Vec<String> = devices
            .into_iter()
            .map(|device| device.serial_number)
            .filter(|serial| {
                let enabled = self.devices.is_rrm_enabled(serial);
                if !enabled {
                    debug!(device = %serial, "Skipping initial data for non-RRM device");
                }
                enabled
            })
            .collect();
        info!(devices = serials.len(), "Fetching initial device state");

        let mut fetches = std::pin::pin!(stream::iter(serials)
            .map(|serial| async move {
                let records = client.latest_stats(&serial, 1).await;
                (serial, records)
            })
            .buffer_unordered(self.params.backfill_concurrency.max(1)));

        while let Some((serial, records)) = fetches.next().await {
            self.install_initial_state(&serial, records);
        }
    }

    fn install_initial_state(&self, serial: &str, records: Option<StatisticsRecords>) {
        let Some(records) = records else {
            error!(device = serial, "Failed to fetch latest state");
            return;
        };
        let [details] = records.data.as_slice() else {
            error!(
                device = serial,
                records = records.data.len(),
                "Expected exactly one latest state record"
            );
            return;
        };
        let Some(payload) = details.data.as_ref() else {
            error!(device = serial, "Latest state record has no data");
            return;
        };

        match State::from_payload(payload) {
            Ok(state) => {
                self.data_model.states().insert(serial, state);
                self.metrics.device_backfilled();
                debug!(device = serial, "Installed initial state");
            }
            Err(e) => {
                self.metrics.parse_failed();
                error!(device = serial, error = %e, "Failed to parse initial state");
            }
        }
    }

    fn process_data(&self, input: InputData) {
        let InputData { kind, records } = input;
        let received = records.len();
        let records: Vec<TelemetryRecord> = records
            .into_iter()
            .filter(|record| self.devices.is_rrm_enabled(&record.serial_number))
            .collect();

        let dropped = received - records.len();
        if dropped > 0 {
            debug!(kind = ?kind, dropped, "Dropping records for non-RRM devices");
            self.metrics.records_dropped(dropped as u64);
        }

        match kind {
            InputDataType::State => records.iter().for_each(|r| self.apply_state(r)),
            InputDataType::WifiScan => records.iter().for_each(|r| self.apply_wifi_scan(r)),
        }
        self.metrics.batch_processed();
    }

    fn apply_state(&self, record: &TelemetryRecord) {
        let serial = record.serial_number.as_str();
        let Some(payload) = record.payload.get("state").filter(|state| state.is_object()) else {
            debug!(device = serial, "State record has no state object, skipping");
            return;
        };

        match State::from_payload(payload) {
            Ok(state) => {
                self.data_model.states().insert(serial, state);
                self.metrics.state_updated();
                debug!(device = serial, "Received state");
            }
            Err(e) => {
                self.metrics.parse_failed();
                error!(device = serial, error = %e, "Failed to parse state record");
            }
        }
    }

    /// A device gets a scan history on its first parseable scan; records that
    /// fail to parse never create an empty one.
    fn apply_wifi_scan(&self, record: &TelemetryRecord) {
        let serial = record.serial_number.as_str();
        match parse_wifi_scan_entries(&record.payload) {
            Ok(entries) => {
                self.data_model.append_wifi_scan(
                    serial,
                    entries,
                    self.params.wifi_scan_buffer_size,
                );
                self.metrics.wifi_scan_appended();
                debug!(device = serial, "Received wifi scan result");
            }
            Err(e) => {
                self.metrics.parse_failed();
                debug!(device = serial, error = %e, "Skipping unparseable wifi scan record");
            }
        }
    }
}

// =============================================================================
// Modeler
// =============================================================================

/// The telemetry modeler.
///
/// Construction registers a [`QueueingTelemetryListener`] with every telemetry
/// source and a [`ModelUpdater`] with every capability and config source.
/// When telemetry sources are supplied, only they hold the queue's senders:
/// once all of them drop their listeners, [`Modeler::run`] returns
/// [`ModelerError::QueueClosed`]. Without telemetry sources the modeler keeps
/// its own sender, so it runs on the hooks alone until cancelled.
pub struct Modeler {
    ingest: Ingest,
    client: Arc<dyn GatewayClient>,
    input_rx: mpsc::Receiver<InputData>,
    idle_tx: Option<mpsc::Sender<InputData>>,
    state_tx: watch::Sender<ModelerState>,
}

impl Modeler {
    /// Create the modeler and subscribe it to `sources`.
    ///
    /// # Arguments
    ///
    /// * `params` - Buffer, queue and backfill settings
    /// * `devices` - Device configuration used for RRM-enabled checks
    /// * `client` - Gateway client used for the initial backfill
    /// * `sources` - Notification sources to subscribe to
    pub fn new(
        params: ModelerParams,
        devices: Arc<dyn DeviceConfigLookup>,
        client: Arc<dyn GatewayClient>,
        sources: &ListenerSources,
    ) -> Self {
        let data_model = Arc::new(DataModel::new());
        let metrics = Arc::new(ModelerMetrics::new());
        let (input_tx, input_rx) = mpsc::channel(params.queue_capacity.max(1));
        let (state_tx, _) = watch::channel(ModelerState::Starting);

        let idle_tx = if sources.telemetry.is_empty() {
            debug!("No telemetry sources, modeler will only run hooks");
            Some(input_tx)
        } else {
            let listener = Arc::new(QueueingTelemetryListener::new(input_tx, Arc::clone(&metrics)));
            for source in &sources.telemetry {
                source.add_telemetry_listener(MODELER_LISTENER_ID, listener.clone());
            }
            None
        };

        let updater = Arc::new(ModelUpdater::new(Arc::clone(&data_model)));
        for source in &sources.capability {
            source.add_capability_listener(MODELER_LISTENER_ID, updater.clone());
        }
        for source in &sources.config {
            source.add_config_listener(MODELER_LISTENER_ID, updater.clone());
        }

        Self {
            ingest: Ingest {
                params,
                data_model,
                devices,
                metrics,
            },
            client,
            input_rx,
            idle_tx,
            state_tx,
        }
    }

    /// A cloneable handle for readers of the model.
    pub fn handle(&self) -> ModelerHandle {
        ModelerHandle {
            data_model: Arc::clone(&self.ingest.data_model),
            devices: Arc::clone(&self.ingest.devices),
            metrics: Arc::clone(&self.ingest.metrics),
            state_rx: self.state_tx.subscribe(),
        }
    }

    /// Runs the modeler until shutdown is signalled or the queue closes.
    ///
    /// Backfills device state first; cancellation is checked only between
    /// batches.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ModelerError> {
        info!("Modeler starting");

        let Self {
            ingest,
            client,
            mut input_rx,
            idle_tx,
            state_tx,
        } = self;

        state_tx.send_replace(ModelerState::FetchingInitial);
        ingest.fetch_initial_data(client.as_ref()).await;
        state_tx.send_replace(ModelerState::Running);
        info!("Modeler running");

        let result = loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Modeler shutting down");
                    break Ok(());
                }

                input = input_rx.recv() => match input {
                    Some(input) => ingest.process_data(input),
                    None => {
                        error!("Modeler input queue closed");
                        break Err(ModelerError::QueueClosed);
                    }
                }
            }
        };

        drop(idle_tx);
        state_tx.send_replace(ModelerState::Terminated);
        info!(metrics = %ingest.metrics.snapshot(), "Modeler stopped");
        result
    }
}

impl fmt::Debug for Modeler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modeler")
            .field("params", &self.ingest.params)
            .field("state", &*self.state_tx.borrow())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Read access to the modeler's model, state and counters.
#[derive(Clone)]
pub struct ModelerHandle {
    data_model: Arc<DataModel>,
    devices: Arc<dyn DeviceConfigLookup>,
    metrics: Arc<ModelerMetrics>,
    state_rx: watch::Receiver<ModelerState>,
}

impl ModelerHandle {
    /// The live model. Values read from it may change between calls.
    pub fn data_model(&self) -> Arc<DataModel> {
        Arc::clone(&self.data_model)
    }

    /// An independent copy of the model.
    pub fn data_model_copy(&self) -> DataModel {
        self.data_model.deep_copy()
    }

    /// Drop model entries for devices that are no longer RRM-enabled.
    pub fn revalidate(&self) -> RevalidationReport {
        let devices = &self.devices;
        self.data_model
            .revalidate(|serial| devices.is_rrm_enabled(serial))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ModelerState {
        *self.state_rx.borrow()
    }

    /// Wait until the modeler reaches `target`.
    ///
    /// Returns `false` if the modeler stopped without reaching it.
    pub async fn wait_for_state(&self, target: ModelerState) -> bool {
        let mut state_rx = self.state_rx.clone();
        let reached = state_rx.wait_for(|state| *state == target).await.is_ok();
        reached
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> ModelerMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl fmt::Debug for ModelerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelerHandle")
            .field("state", &self.state())
            .field("metrics", &self.metrics())
            .finish_non_exhaustive()
    }
}

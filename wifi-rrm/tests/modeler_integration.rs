//! Integration tests for the modeler.
//!
//! These tests drive the complete ingestion flow:
//! - Gateway backfill → DataModel
//! - ListenerHub → QueueingTelemetryListener → modeler task → DataModel
//! - Capability/config hooks → DataModel
//! - Revalidation after RRM is disabled
//!
//! Run with: `cargo test --test modeler_integration`

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use wifi_rrm::config::ModelerParams;
use wifi_rrm::device::{DeviceConfig, DeviceRegistry};
use wifi_rrm::gateway::{
    BoxFuture, DeviceWithStatus, GatewayClient, ListenerHub, StatisticsDetails,
    StatisticsRecords, TelemetryRecord,
};
use wifi_rrm::model::{ApConfiguration, DeviceCapabilities};
use wifi_rrm::modeler::{ListenerSources, Modeler, ModelerError, ModelerHandle, ModelerState};

// ============================================================================
// Helper Functions
// ============================================================================

const DEVICE_A: &str = "aaaaaaaaaaaa";
const DEVICE_B: &str = "bbbbbbbbbbbb";
const DEVICE_OFF: &str = "cccccccccccc";

/// Gateway returning one stored state per listed device.
struct StaticGateway {
    states: HashMap<String, Value>,
}

impl GatewayClient for StaticGateway {
    fn list_devices(&self) -> BoxFuture<'_, Option<Vec<DeviceWithStatus>>> {
        Box::pin(async move {
            let mut devices: Vec<_> = self.states.keys().map(DeviceWithStatus::new).collect();
            devices.sort_by(|a, b| a.serial_number.cmp(&b.serial_number));
            Some(devices)
        })
    }

    fn latest_stats<'a>(
        &'a self,
        serial: &'a str,
        _count: usize,
    ) -> BoxFuture<'a, Option<StatisticsRecords>> {
        Box::pin(async move {
            let state = self.states.get(serial)?;
            Some(StatisticsRecords {
                serial_number: serial.to_string(),
                data: vec![StatisticsDetails {
                    data: Some(state.clone()),
                    uuid: 1,
                    recorded: 1_700_000_000,
                }],
            })
        })
    }
}

fn state_object(tx_power: i32, rssi: i32) -> Value {
    json!({
        "radios": [{"tx_power": tx_power, "channel_width": "40", "channel": 36}],
        "interfaces": [{
            "name": "up0v0",
            "ssids": [{
                "ssid": "office",
                "associations": [{"bssid": "11:22:33:44:55:66", "rssi": rssi}]
            }]
        }]
    })
}

fn scan_payload(channel: u32) -> Value {
    json!({
        "status": {
            "scan": [{
                "bssid": "aa:bb:cc:00:00:01",
                "ssid": "neighbor",
                "channel": channel,
                "signal": -70
            }]
        }
    })
}

fn registry() -> Arc<DeviceRegistry> {
    let registry = DeviceRegistry::new();
    registry.set_device_config(DEVICE_A, DeviceConfig::enabled());
    registry.set_device_config(DEVICE_B, DeviceConfig::enabled());
    registry.set_device_config(DEVICE_OFF, DeviceConfig::disabled());
    Arc::new(registry)
}

fn gateway() -> Arc<StaticGateway> {
    let states = [
        (DEVICE_A.to_string(), state_object(10, -60)),
        (DEVICE_OFF.to_string(), state_object(10, -60)),
    ]
    .into_iter()
    .collect();
    Arc::new(StaticGateway { states })
}

/// Wait until `done` holds, failing the test after a few seconds.
async fn eventually(handle: &ModelerHandle, done: impl Fn(&ModelerHandle) -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done(handle) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

struct Running {
    hub: Arc<ListenerHub>,
    registry: Arc<DeviceRegistry>,
    handle: ModelerHandle,
    shutdown: CancellationToken,
    task: tokio::task::JoinHandle<Result<(), ModelerError>>,
}

async fn start(params: ModelerParams) -> Running {
    let hub = Arc::new(ListenerHub::new());
    let registry = registry();
    let modeler = Modeler::new(
        params,
        registry.clone(),
        gateway(),
        &ListenerSources::from_hub(&hub),
    );
    let handle = modeler.handle();
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(modeler.run(shutdown.clone()));
    assert!(handle.wait_for_state(ModelerState::Running).await);

    Running {
        hub,
        registry,
        handle,
        shutdown,
        task,
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

#[tokio::test]
async fn test_backfill_installs_enabled_devices() {
    let running = start(ModelerParams::default()).await;

    let model = running.handle.data_model();
    assert_eq!(model.states().keys(), vec![DEVICE_A]);
    let state = model.states().get(DEVICE_A).unwrap();
    assert_eq!(state.radios[0].channel_width, Some(40));
    assert_eq!(running.handle.metrics().devices_backfilled, 1);

    running.shutdown.cancel();
    assert_eq!(running.task.await.unwrap(), Ok(()));
}

#[tokio::test]
async fn test_streamed_telemetry_reaches_model() {
    let running = start(ModelerParams::default().with_wifi_scan_buffer_size(2)).await;

    running.hub.publish_state_records(vec![
        TelemetryRecord::new(DEVICE_B, json!({"state": state_object(17, -72)})),
        TelemetryRecord::new(DEVICE_OFF, json!({"state": state_object(5, -50)})),
    ]);
    for channel in [1, 6, 11] {
        running
            .hub
            .publish_wifi_scan_records(vec![TelemetryRecord::new(DEVICE_A, scan_payload(channel))]);
    }

    eventually(&running.handle, |h| h.metrics().batches_processed == 4).await;

    let model = running.handle.data_model();
    assert_eq!(model.states().keys(), vec![DEVICE_A, DEVICE_B]);
    assert_eq!(model.states().get(DEVICE_B).unwrap().radios[0].tx_power, Some(17));

    let history = model.wifi_scans().get(DEVICE_A).unwrap();
    let channels: Vec<_> = history.iter().map(|batch| batch[0].channel).collect();
    assert_eq!(channels, vec![Some(6), Some(11)]);

    let metrics = running.handle.metrics();
    assert_eq!(metrics.records_dropped, 1);
    assert_eq!(metrics.wifi_scans_appended, 3);

    running.shutdown.cancel();
    assert_eq!(running.task.await.unwrap(), Ok(()));
    assert_eq!(running.handle.state(), ModelerState::Terminated);
}

#[tokio::test]
async fn test_hooks_and_revalidation() {
    let running = start(ModelerParams::default()).await;
    let hub = &running.hub;

    hub.publish_capabilities(
        DEVICE_A,
        DeviceCapabilities::new(json!({"wifi": {"phy0": {"band": ["5G"]}}})),
    );
    let modified = hub.publish_config(
        DEVICE_A,
        &ApConfiguration::new(json!({"radios": [{"band": "5G", "channel": 36}]})),
    );
    assert!(!modified);
    hub.publish_wifi_scan_records(vec![TelemetryRecord::new(DEVICE_A, scan_payload(36))]);
    eventually(&running.handle, |h| h.metrics().batches_processed == 1).await;

    let copy = running.handle.data_model_copy();
    let model = running.handle.data_model();
    assert!(model.capabilities().contains(DEVICE_A));
    assert!(model.device_status().contains(DEVICE_A));

    running.registry.set_rrm_enabled(DEVICE_A, false);
    let report = running.handle.revalidate();

    assert!(report.states && report.wifi_scans && report.device_status && report.capabilities);
    assert!(model.states().is_empty());
    assert!(model.wifi_scans().is_empty());
    assert!(model.device_status().is_empty());
    assert!(model.capabilities().is_empty());
    assert!(copy.states().contains(DEVICE_A));

    running.shutdown.cancel();
    running.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_dropping_all_producers_stops_with_error() {
    let running = start(ModelerParams::default()).await;

    drop(running.hub);

    assert_eq!(running.task.await.unwrap(), Err(ModelerError::QueueClosed));
    assert_eq!(running.handle.state(), ModelerState::Terminated);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_producers_and_hooks() {
    const PRODUCERS: usize = 4;
    const BATCHES: usize = 25;

    let hub = Arc::new(ListenerHub::new());
    let registry = DeviceRegistry::new();
    let serials: Vec<String> = (0..PRODUCERS).map(|i| format!("00000000000{i}")).collect();
    for serial in &serials {
        registry.set_device_config(serial.clone(), DeviceConfig::enabled());
    }
    let modeler = Modeler::new(
        ModelerParams::default(),
        Arc::new(registry),
        Arc::new(StaticGateway {
            states: HashMap::new(),
        }),
        &ListenerSources::from_hub(&hub),
    );
    let handle = modeler.handle();
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(modeler.run(shutdown.clone()));
    assert!(handle.wait_for_state(ModelerState::Running).await);

    let mut threads = Vec::new();
    for serial in serials.clone() {
        let hub = hub.clone();
        threads.push(std::thread::spawn(move || {
            for tx_power in 1..=BATCHES as i32 {
                hub.publish_state_records(vec![TelemetryRecord::new(
                    serial.as_str(),
                    json!({"state": state_object(tx_power, -60)}),
                )]);
            }
        }));
    }
    for serial in serials.clone() {
        let hub = hub.clone();
        threads.push(std::thread::spawn(move || {
            for channel in [36, 40, 44, 48] {
                hub.publish_capabilities(
                    &serial,
                    DeviceCapabilities::new(json!({"wifi": {"phy0": {"channel": channel}}})),
                );
                hub.publish_config(
                    &serial,
                    &ApConfiguration::new(json!({"radios": [{"band": "5G", "channel": channel}]})),
                );
            }
        }));
    }
    for thread in threads {
        thread.join().unwrap();
    }

    let expected = (PRODUCERS * BATCHES) as u64;
    eventually(&handle, |h| h.metrics().batches_processed == expected).await;

    let metrics = handle.metrics();
    assert_eq!(metrics.batches_received, expected);
    assert_eq!(metrics.batches_rejected, 0);
    assert_eq!(metrics.state_updates, expected);

    let model = handle.data_model();
    assert_eq!(model.states().keys(), serials);
    for serial in &serials {
        let state = model.states().get(serial).unwrap();
        assert_eq!(state.radios[0].tx_power, Some(BATCHES as i32));
        assert_eq!(
            model.capabilities().get(serial),
            Some(json!({"phy0": {"channel": 48}}))
        );
        assert_eq!(model.device_status().get(serial).unwrap()[0]["channel"], 48);
    }

    shutdown.cancel();
    assert_eq!(task.await.unwrap(), Ok(()));
}

#[tokio::test]
async fn test_without_telemetry_sources_keeps_running() {
    let hub = Arc::new(ListenerHub::new());
    let modeler = Modeler::new(
        ModelerParams::default(),
        registry(),
        gateway(),
        &ListenerSources::new()
            .with_capability(hub.clone())
            .with_config(hub.clone()),
    );
    let handle = modeler.handle();
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(modeler.run(shutdown.clone()));
    assert!(handle.wait_for_state(ModelerState::Running).await);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!task.is_finished());

    hub.publish_config(
        DEVICE_A,
        &ApConfiguration::new(json!({"radios": [{"band": "2G", "channel": 6}]})),
    );
    assert!(handle.data_model().device_status().contains(DEVICE_A));
    assert_eq!(handle.data_model().states().keys(), vec![DEVICE_A]);

    shutdown.cancel();
    assert_eq!(task.await.unwrap(), Ok(()));
    assert_eq!(handle.state(), ModelerState::Terminated);
}

mod common;

use common::*;
use domain::{Device, LatestValue, Liveness, RegisterDataType, now_epoch_ms};
use plc_collection::{CollectionConfig, CollectionEvent};
use plc_storage::{InMemoryDeviceStore, InMemorySettingStore, StoreSet};
use std::sync::Arc;

fn devices() -> Vec<Device> {
    vec![Device::new("D1", 802), Device::new("D2", 804)]
}

#[tokio::test]
async fn one_unreadable_device_fails_cycle_but_keeps_the_other() {
    let client = Arc::new(FakeClient::new([(802, 5)]));
    let stores = seeded_stores(&devices()).await;
    let service = service_with(client, stores.clone(), CollectionConfig::default()).await;

    let report = service.trigger_cycle().await.expect("cycle ran");
    assert!(!report.success);
    assert!(report.connected);
    assert_eq!(report.values.get("D1"), Some(&5.0));
    assert!(!report.values.contains_key("D2"));
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("D2"));
    assert!(report.errors[0].contains("D804"));

    let d1 = stores.latest_values.get_latest_value("D1").await.unwrap();
    assert_eq!(d1.map(|v| v.value), Some(5.0));
    assert!(stores.latest_values.get_latest_value("D2").await.unwrap().is_none());

    let logs = stores.read_logs.list_recent_read_logs(10).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs.iter().filter(|r| r.reading.is_success()).count(), 1);
    assert_eq!(service.last_report(), Some(report));
}

#[tokio::test]
async fn zero_readable_devices_is_a_failed_cycle() {
    let client = Arc::new(FakeClient::new([]));
    let stores = seeded_stores(&devices()).await;
    let service = service_with(client, stores.clone(), CollectionConfig::default()).await;

    let report = service.trigger_cycle().await.expect("cycle ran");
    assert!(!report.success);
    assert!(report.values.is_empty());
    assert!(report.errors.iter().any(|e| e == "no device data read"));
    assert!(stores.latest_values.list_latest_values().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_registry_reports_no_data() {
    let client = Arc::new(FakeClient::new([(802, 1)]));
    let service = service_with(
        client.clone(),
        StoreSet::in_memory(),
        CollectionConfig::default(),
    )
    .await;

    let report = service.trigger_cycle().await.expect("cycle ran");
    assert!(!report.success);
    assert!(report.values.is_empty());
    assert_eq!(client.reads(), 0);
}

#[tokio::test]
async fn disabled_devices_are_never_read() {
    let mut disabled = Device::new("D2", 804);
    disabled.enabled = false;
    let client = Arc::new(FakeClient::new([(802, 1), (804, 2)]));
    let stores = seeded_stores(&[Device::new("D1", 802), disabled]).await;
    let service = service_with(client.clone(), stores.clone(), CollectionConfig::default()).await;

    let report = service.trigger_cycle().await.expect("cycle ran");
    assert!(report.success);
    assert_eq!(client.reads(), 1);
    let logs = stores.read_logs.list_recent_read_logs(10).await.unwrap();
    assert!(logs.iter().all(|r| r.reading.device_name == "D1"));
}

#[tokio::test]
async fn unreachable_plc_still_publishes_cycle_outcome() {
    let client = Arc::new(FakeClient::new([(802, 5)]));
    client.set_reachable(false);
    let stores = seeded_stores(&devices()).await;
    let service = service_with(client.clone(), stores.clone(), CollectionConfig::default()).await;
    let mut events = service.subscribe();

    let report = service.trigger_cycle().await.expect("cycle ran");
    assert!(!report.success);
    assert!(!report.connected);
    assert!(report.values.is_empty());
    assert!(report.errors[0].contains("not connected"));
    assert_eq!(client.reads(), 0);

    service.trigger_cycle().await.expect("second cycle ran");
    let events = drain(&mut events);
    let disconnects = events
        .iter()
        .filter(|e| matches!(e, CollectionEvent::ConnectionChanged(c) if !c.connected))
        .count();
    let cycles = events
        .iter()
        .filter(|e| matches!(e, CollectionEvent::CycleCompleted(_)))
        .count();
    assert_eq!(disconnects, 2);
    assert_eq!(cycles, 2);
    assert!(stores.read_logs.list_recent_read_logs(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn connected_event_only_on_change() {
    let client = Arc::new(FakeClient::new([(802, 5), (804, 6)]));
    let service = service_with(
        client.clone(),
        seeded_stores(&devices()).await,
        CollectionConfig::default(),
    )
    .await;
    let mut events = service.subscribe();

    for _ in 0..3 {
        assert!(service.trigger_cycle().await.expect("cycle ran").success);
    }
    let connects = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, CollectionEvent::ConnectionChanged(c) if c.connected))
        .count();
    assert_eq!(connects, 1);
    assert_eq!(client.connects(), 1);
}

#[tokio::test]
async fn connection_lost_mid_cycle_is_reported() {
    let client = Arc::new(FakeClient::new([(802, 5), (804, 6)]));
    client.lose_connection_at(804);
    let service = service_with(
        client.clone(),
        seeded_stores(&devices()).await,
        CollectionConfig::default(),
    )
    .await;
    let mut events = service.subscribe();

    let report = service.trigger_cycle().await.expect("cycle ran");
    assert!(!report.connected);
    assert!(!report.success);
    assert_eq!(report.values.len(), 1);

    let events = drain(&mut events);
    let flags: Vec<bool> = events
        .iter()
        .filter_map(|e| match e {
            CollectionEvent::ConnectionChanged(c) => Some(c.connected),
            CollectionEvent::CycleCompleted(_) => None,
        })
        .collect();
    assert_eq!(flags, vec![true, false]);
}

#[tokio::test]
async fn broken_session_reconnects_for_remaining_devices() {
    let client = Arc::new(FakeClient::new([(802, 5), (804, 6), (806, 7)]));
    client.lose_connection_at(804);
    let stores = seeded_stores(&[
        Device::new("D1", 802),
        Device::new("D2", 804),
        Device::new("D3", 806),
    ])
    .await;
    let service = service_with(client.clone(), stores.clone(), CollectionConfig::default()).await;
    let mut events = service.subscribe();

    let report = service.trigger_cycle().await.expect("cycle ran");
    assert!(report.connected);
    assert!(!report.success);
    assert_eq!(report.values.get("D1"), Some(&5.0));
    assert_eq!(report.values.get("D3"), Some(&7.0));
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("D804"));
    assert_eq!(client.connects(), 2);

    let d3 = stores.latest_values.get_latest_value("D3").await.unwrap();
    assert_eq!(d3.map(|v| v.value), Some(7.0));

    let flags: Vec<bool> = drain(&mut events)
        .iter()
        .filter_map(|e| match e {
            CollectionEvent::ConnectionChanged(c) => Some(c.connected),
            CollectionEvent::CycleCompleted(_) => None,
        })
        .collect();
    assert_eq!(flags, vec![true, false, true]);
}

#[tokio::test]
async fn failed_reconnect_marks_remaining_devices_without_retrying() {
    let client = Arc::new(FakeClient::new([(802, 5), (804, 6), (806, 7), (808, 8)]));
    client.go_down_at(804);
    let stores = seeded_stores(&[
        Device::new("D1", 802),
        Device::new("D2", 804),
        Device::new("D3", 806),
        Device::new("D4", 808),
    ])
    .await;
    let service = service_with(client.clone(), stores, CollectionConfig::default()).await;

    let report = service.trigger_cycle().await.expect("cycle ran");
    assert!(!report.connected);
    assert_eq!(report.values.len(), 1);
    assert_eq!(report.errors.len(), 3);
    assert!(report.errors[1].contains("not connected"));
    assert_eq!(client.connects(), 2);
}

#[tokio::test]
async fn failed_read_leaves_latest_value_unchanged() {
    let client = Arc::new(FakeClient::new([(802, 5), (804, 6)]));
    let stores = seeded_stores(&devices()).await;
    let service = service_with(client.clone(), stores.clone(), CollectionConfig::default()).await;

    service.trigger_cycle().await.expect("cycle ran");
    let before = stores
        .latest_values
        .get_latest_value("D1")
        .await
        .unwrap()
        .expect("D1 stored");
    assert_eq!(before.value, 5.0);

    client.remove_value(802);
    let report = service.trigger_cycle().await.expect("cycle ran");
    assert!(!report.values.contains_key("D1"));
    let after = stores.latest_values.get_latest_value("D1").await.unwrap();
    assert_eq!(after, Some(before));
}

#[tokio::test]
async fn signed_registers_are_decoded() {
    let mut device = Device::new("temperature", 806);
    device.data_type = RegisterDataType::Int16;
    let client = Arc::new(FakeClient::new([(806, 0xFF9C)]));
    let service = service_with(
        client,
        seeded_stores(&[device]).await,
        CollectionConfig::default(),
    )
    .await;

    let report = service.trigger_cycle().await.expect("cycle ran");
    assert_eq!(report.values.get("temperature"), Some(&-100.0));
}

#[tokio::test]
async fn read_log_failure_does_not_fail_cycle() {
    let client = Arc::new(FakeClient::new([(802, 5), (804, 6)]));
    let base = seeded_stores(&devices()).await;
    let stores = StoreSet {
        read_logs: Arc::new(BrokenReadLogStore),
        ..base
    };
    let service = service_with(client, stores.clone(), CollectionConfig::default()).await;

    let report = service.trigger_cycle().await.expect("cycle ran");
    assert!(report.success);
    assert!(report.errors.is_empty());
    assert!(stores.latest_values.get_latest_value("D2").await.unwrap().is_some());
}

#[tokio::test]
async fn latest_value_failure_is_retried_then_marks_device() {
    let client = Arc::new(FakeClient::new([(802, 5)]));
    let flaky = Arc::new(FlakyLatestValueStore::new(1));
    let stores = StoreSet {
        latest_values: flaky.clone(),
        ..seeded_stores(&[Device::new("D1", 802)]).await
    };
    let service = service_with(client.clone(), stores.clone(), CollectionConfig::default()).await;

    let report = service.trigger_cycle().await.expect("cycle ran");
    assert!(report.success, "one retry absorbs a single failure");
    assert_eq!(flaky.attempts(), 2);

    let always_failing = Arc::new(FlakyLatestValueStore::new(usize::MAX));
    let stores = StoreSet {
        latest_values: always_failing.clone(),
        ..stores
    };
    let service = service_with(client, stores, CollectionConfig::default()).await;
    let report = service.trigger_cycle().await.expect("cycle ran");
    assert!(!report.success);
    assert_eq!(report.values.get("D1"), Some(&5.0));
    assert!(report.errors.iter().any(|e| e.starts_with("D1: persist latest value failed")));
    assert_eq!(always_failing.attempts(), 2);
}

#[tokio::test]
async fn device_statuses_classify_liveness() {
    let now = now_epoch_ms();
    let stores = StoreSet {
        devices: Arc::new(InMemoryDeviceStore::with_devices([
            Device::new("fresh", 802),
            Device::new("stale", 804),
            Device::new("never", 806),
        ])),
        settings: Arc::new(InMemorySettingStore::new()),
        ..StoreSet::in_memory()
    };
    for (name, address, ts) in [("fresh", 802, now - 1_000), ("stale", 804, now - 3_600_000)] {
        stores
            .latest_values
            .upsert_latest_value(&LatestValue {
                device_name: name.to_string(),
                address,
                value: 1.0,
                updated_at_ms: ts,
            })
            .await
            .unwrap();
    }
    let service = service_with(
        Arc::new(FakeClient::new([])),
        stores,
        CollectionConfig::default(),
    )
    .await;

    let statuses = service.device_statuses().await.unwrap();
    let buckets: Vec<_> = statuses.iter().map(|s| (s.name.as_str(), s.liveness)).collect();
    assert_eq!(
        buckets,
        vec![
            ("fresh", Liveness::Fresh),
            ("stale", Liveness::Stale),
            ("never", Liveness::Unknown),
        ]
    );
    assert_eq!(statuses[2].value, None);
}

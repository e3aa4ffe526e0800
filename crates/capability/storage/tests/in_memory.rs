use domain::{Device, LatestValue, Reading};
use plc_storage::{
    DAY_MS, DeviceStore, InMemoryDeviceStore, InMemoryLatestValueStore, InMemoryReadLogStore,
    InMemorySettingStore, LatestValueStore, ReadLogStore, SettingStore,
};

#[tokio::test]
async fn enabled_devices_are_filtered_and_ordered() {
    let mut disabled = Device::new("D806", 806);
    disabled.enabled = false;
    let store = InMemoryDeviceStore::with_devices([
        Device::new("D804", 804),
        Device::new("D802", 802),
        disabled,
    ]);

    let enabled = store.list_enabled_devices().await.expect("list");
    let names: Vec<_> = enabled.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["D802", "D804"]);
    assert_eq!(store.list_devices().await.expect("list all").len(), 3);

    assert!(store.set_device_enabled("D806", true).await.expect("enable"));
    assert!(!store.set_device_enabled("missing", true).await.expect("enable"));
    assert_eq!(store.list_enabled_devices().await.expect("list").len(), 3);
}

#[tokio::test]
async fn latest_value_round_trip() {
    let store = InMemoryLatestValueStore::new();
    let value = LatestValue {
        device_name: "X".to_string(),
        address: 802,
        value: 5.0,
        updated_at_ms: 1_000,
    };
    store.upsert_latest_value(&value).await.expect("upsert");
    let loaded = store
        .get_latest_value("X")
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(loaded.value, 5.0);
    assert_eq!(loaded.updated_at_ms, 1_000);
    assert!(store.get_latest_value("Y").await.expect("get").is_none());
}

#[tokio::test]
async fn read_log_purge_and_recent_order() {
    let store = InMemoryReadLogStore::new();
    let device = Device::new("D802", 802);
    let now = 100 * DAY_MS;
    store
        .append_read_log(&Reading::success(&device, 1.0, now - 40 * DAY_MS))
        .await
        .expect("append old");
    store
        .append_read_log(&Reading::failure(&device, "timeout", now - DAY_MS))
        .await
        .expect("append recent");
    store
        .append_read_log(&Reading::success(&device, 3.0, now))
        .await
        .expect("append now");

    let purged = store.purge_logs_older_than(30, now).await.expect("purge");
    assert_eq!(purged, 1);
    assert_eq!(store.len(), 2);

    let recent = store.list_recent_read_logs(10).await.expect("recent");
    assert_eq!(recent[0].reading.value, Some(3.0));
    assert_eq!(recent[1].reading.error.as_deref(), Some("timeout"));
    assert_eq!(store.list_recent_read_logs(1).await.expect("recent").len(), 1);
}

#[tokio::test]
async fn settings_overwrite() {
    let store = InMemorySettingStore::new();
    assert!(store.get_setting("plc_port").await.expect("get").is_none());
    store.set_setting("plc_port", "502").await.expect("set");
    store.set_setting("plc_port", "5020").await.expect("set");
    assert_eq!(
        store.get_setting("plc_port").await.expect("get").as_deref(),
        Some("5020")
    );
}

use api_contract::{
    CollectionStatusDto, ConnectionDto, CycleReportDto, DeviceConfigDto, DeviceStatusDto,
    UpdateIntervalRequest,
};
use serde_json::Value;
use std::collections::BTreeMap;

#[test]
fn collection_status_is_camel_case() {
    let status = CollectionStatusDto {
        running: true,
        interval_seconds: 5,
        device_count: 2,
        connection: ConnectionDto {
            connected: false,
            host: "192.168.1.2".to_string(),
            port: 502,
            status_message: "disconnected".to_string(),
        },
        last_cycle: Some(CycleReportDto {
            cycle_id: "c-1".to_string(),
            started_at_ms: 1,
            finished_at_ms: 2,
            values: BTreeMap::from([("D1".to_string(), 5.0)]),
            errors: vec![],
            success: true,
            connected: true,
        }),
    };
    let value = serde_json::to_value(status).expect("serialize");
    assert_eq!(value["intervalSeconds"], 5);
    assert_eq!(value["deviceCount"], 2);
    assert_eq!(value["connection"]["statusMessage"], "disconnected");
    assert_eq!(value["lastCycle"]["values"]["D1"], 5.0);
    assert!(value.get("interval_seconds").is_none());
}

#[test]
fn device_status_keeps_null_fields() {
    let dto = DeviceStatusDto {
        name: "D3".to_string(),
        address: "D806".to_string(),
        description: None,
        value: None,
        updated_at_ms: None,
        enabled: true,
        liveness: "unknown".to_string(),
    };
    let value = serde_json::to_value(dto).expect("serialize");
    assert_eq!(value["updatedAtMs"], Value::Null);
    assert_eq!(value["value"], Value::Null);
    assert_eq!(value["liveness"], "unknown");
}

#[test]
fn device_config_defaults_to_enabled() {
    let payload = r#"[
        {"name":"D1","address":"D802"},
        {"name":"D2","address":"804","enabled":false,"dataType":"int16","description":"温度"}
    ]"#;
    let devices: Vec<DeviceConfigDto> = serde_json::from_str(payload).expect("parse");
    assert!(devices[0].enabled);
    assert!(devices[0].data_type.is_none());
    assert!(!devices[1].enabled);
    assert_eq!(devices[1].data_type.as_deref(), Some("int16"));
}

#[test]
fn interval_request_accepts_both_casings() {
    let camel: UpdateIntervalRequest =
        serde_json::from_str(r#"{"intervalSeconds":10}"#).expect("parse");
    let snake: UpdateIntervalRequest =
        serde_json::from_str(r#"{"interval_seconds":-5}"#).expect("parse");
    assert_eq!(camel.interval_seconds, 10);
    assert_eq!(snake.interval_seconds, -5);
}

//! 状态查询视图

use crate::error::CollectionError;
use crate::events::CycleReport;
use domain::{CollectionRunState, ConnectionState, DeviceStatus, Liveness};
use plc_storage::StoreSet;
use std::collections::HashMap;

/// 采集服务整体状态。
#[derive(Debug, Clone)]
pub struct CollectionStatus {
    pub run_state: CollectionRunState,
    pub connection: ConnectionState,
    pub device_count: usize,
    pub last_report: Option<CycleReport>,
}

/// 合并设备配置与最新值，计算新鲜度（按地址排序，含禁用设备）。
pub async fn device_statuses(
    stores: &StoreSet,
    now_ms: i64,
    fresh_window_ms: i64,
) -> Result<Vec<DeviceStatus>, CollectionError> {
    let devices = stores.devices.list_devices().await?;
    let latest: HashMap<String, _> = stores
        .latest_values
        .list_latest_values()
        .await?
        .into_iter()
        .map(|value| (value.device_name.clone(), value))
        .collect();

    Ok(devices
        .into_iter()
        .map(|device| {
            let latest = latest.get(&device.name);
            let updated_at_ms = latest.map(|value| value.updated_at_ms);
            DeviceStatus {
                value: latest.map(|value| value.value),
                updated_at_ms,
                liveness: Liveness::classify(updated_at_ms, now_ms, fresh_window_ms),
                name: device.name,
                address: device.address,
                description: device.description,
                enabled: device.enabled,
            }
        })
        .collect())
}

//! 设备 handlers
//!
//! - GET /api/devices/status - 全部设备的最新值与新鲜度
//! - POST /api/devices/reload - 从存储重新加载启用设备
//! - PUT /api/devices/{name}/enabled - 修改启用状态（重新加载后生效）

use crate::AppState;
use crate::utils::response::{
    collection_error, device_status_to_dto, not_found_error, ok, storage_error,
};
use api_contract::{DeviceStatusDto, ReloadDevicesDto, SetDeviceEnabledRequest};
use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use tracing::info;

pub async fn list_device_statuses(State(state): State<AppState>) -> Response {
    match state.collection.device_statuses().await {
        Ok(statuses) => ok(statuses
            .into_iter()
            .map(device_status_to_dto)
            .collect::<Vec<DeviceStatusDto>>()),
        Err(err) => collection_error(err),
    }
}

pub async fn reload_devices(State(state): State<AppState>) -> Response {
    match state.collection.reload_devices().await {
        Ok(device_count) => ok(ReloadDevicesDto { device_count }),
        Err(err) => collection_error(err),
    }
}

pub async fn set_device_enabled(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<SetDeviceEnabledRequest>,
) -> Response {
    match state
        .collection
        .stores()
        .devices
        .set_device_enabled(&name, req.enabled)
        .await
    {
        Ok(true) => {
            info!(
                target: "plc.api",
                device = %name,
                enabled = req.enabled,
                "device_enabled_changed"
            );
            ok(serde_json::json!({ "name": name, "enabled": req.enabled }))
        }
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

//! 稳定的 DTO 与 API 响应契约。
//!
//! 字段统一使用 camelCase；时间戳为 epoch 毫秒。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// PLC 连接状态。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDto {
    pub connected: bool,
    pub host: String,
    pub port: u16,
    pub status_message: String,
}

/// 单次采集周期结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReportDto {
    pub cycle_id: String,
    pub started_at_ms: i64,
    pub finished_at_ms: i64,
    /// 设备名 -> 解码后的值
    pub values: BTreeMap<String, f64>,
    pub errors: Vec<String>,
    pub success: bool,
    pub connected: bool,
}

/// 采集服务整体状态。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStatusDto {
    pub running: bool,
    pub interval_seconds: u64,
    pub device_count: usize,
    pub connection: ConnectionDto,
    pub last_cycle: Option<CycleReportDto>,
}

/// 手动触发结果；已有周期在执行时 `executed` 为 false。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResultDto {
    pub executed: bool,
    pub report: Option<CycleReportDto>,
}

/// 设备状态视图。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatusDto {
    pub name: String,
    /// 展示地址，例如 `D802`
    pub address: String,
    pub description: Option<String>,
    pub value: Option<f64>,
    pub updated_at_ms: Option<i64>,
    pub enabled: bool,
    /// `fresh` / `stale` / `unknown`
    pub liveness: String,
}

/// 设备注册表重新加载结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadDevicesDto {
    pub device_count: usize,
}

/// 设备配置（启动时的设备种子文件使用同一结构）。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfigDto {
    pub name: String,
    /// `D802` 或 `802`
    pub address: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub description: Option<String>,
    /// `uint16`（默认）或 `int16`
    #[serde(alias = "data_type")]
    pub data_type: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// 设备启用状态更新请求体。
#[derive(Debug, Deserialize)]
pub struct SetDeviceEnabledRequest {
    pub enabled: bool,
}

/// PLC 端点更新请求体。
#[derive(Debug, Deserialize)]
pub struct UpdateEndpointRequest {
    pub host: String,
    pub port: u16,
}

/// 轮询间隔更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIntervalRequest {
    #[serde(alias = "interval_seconds")]
    pub interval_seconds: i64,
}

/// 读取日志查询参数。
#[derive(Debug, Default, Deserialize)]
pub struct ReadLogQuery {
    pub limit: Option<u32>,
}

/// 读取日志返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadLogDto {
    pub id: i64,
    pub device_name: String,
    pub address: String,
    pub value: Option<f64>,
    pub read_time_ms: i64,
    /// `SUCCESS` / `FAILURE`
    pub status: String,
    pub error: Option<String>,
}

/// 寄存器写入请求体。
#[derive(Debug, Deserialize)]
pub struct WriteRegisterRequest {
    pub value: u16,
}

/// 单个寄存器的原始值。
#[derive(Debug, Serialize)]
pub struct RegisterValueDto {
    pub address: String,
    pub value: u16,
}

/// 采集指标快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub cycles_started: u64,
    pub cycles_succeeded: u64,
    pub cycles_failed: u64,
    pub cycles_skipped: u64,
    pub reads_ok: u64,
    pub reads_failed: u64,
    pub connect_attempts: u64,
    pub connect_failures: u64,
    pub latest_value_write_failures: u64,
    pub read_log_write_failures: u64,
    pub cycle_latency_ms_total: u64,
    pub cycle_latency_ms_count: u64,
}

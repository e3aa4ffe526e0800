//! 启动装配：配置转换、设备种子导入、读取日志定时清理。

use api_contract::DeviceConfigDto;
use domain::{Device, RegisterDataType};
use plc_collection::{CollectionConfig, CollectionService};
use plc_config::AppConfig;
use plc_protocol::{ModbusTcpConfig, parse_register_address};
use plc_storage::{StorageError, StoreSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// 读取日志清理周期。
const PURGE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// 设备种子导入错误。
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("read devices file failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse devices file failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid device {name}: {reason}")]
    InvalidDevice { name: String, reason: String },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub fn modbus_config(config: &AppConfig) -> ModbusTcpConfig {
    ModbusTcpConfig {
        host: config.plc_host.clone(),
        port: config.plc_port,
        unit_id: config.plc_unit_id,
        connect_timeout_ms: config.connect_timeout_ms,
        read_timeout_ms: config.read_timeout_ms,
    }
}

pub fn collection_config(config: &AppConfig) -> CollectionConfig {
    CollectionConfig {
        interval_seconds: config.poll_interval_seconds,
        error_cooldown: Duration::from_secs(config.error_cooldown_seconds),
        persist_retries: config.persist_retries,
        log_retention_days: config.log_retention_days,
        fresh_window_ms: i64::try_from(config.fresh_window_seconds.saturating_mul(1000))
            .unwrap_or(i64::MAX),
        ..CollectionConfig::default()
    }
}

/// 将设备配置转换为领域模型。
pub fn device_from_config(dto: DeviceConfigDto) -> Result<Device, SeedError> {
    let name = dto.name.trim().to_string();
    if name.is_empty() {
        return Err(SeedError::InvalidDevice {
            name: dto.name,
            reason: "name required".to_string(),
        });
    }
    let address =
        parse_register_address(&dto.address).map_err(|err| SeedError::InvalidDevice {
            name: name.clone(),
            reason: err.to_string(),
        })?;
    let data_type = match dto.data_type.as_deref() {
        None => RegisterDataType::default(),
        Some(raw) => RegisterDataType::parse(raw).ok_or_else(|| SeedError::InvalidDevice {
            name: name.clone(),
            reason: format!("unknown data type {raw}"),
        })?,
    };
    Ok(Device {
        name,
        address,
        enabled: dto.enabled,
        description: dto.description.filter(|value| !value.trim().is_empty()),
        data_type,
    })
}

/// 从 JSON 文件导入设备配置（按名称 upsert），返回导入数量。
pub async fn seed_devices_from_file(stores: &StoreSet, path: &str) -> Result<usize, SeedError> {
    let raw = tokio::fs::read_to_string(path).await?;
    seed_devices(stores, &raw).await
}

pub async fn seed_devices(stores: &StoreSet, raw: &str) -> Result<usize, SeedError> {
    let configs: Vec<DeviceConfigDto> = serde_json::from_str(raw)?;
    let devices = configs
        .into_iter()
        .map(device_from_config)
        .collect::<Result<Vec<_>, _>>()?;
    for device in &devices {
        stores.devices.upsert_device(device).await?;
    }
    Ok(devices.len())
}

/// 启动时清理一次读取日志，之后每 24 小时清理一次。
pub fn spawn_log_purge(
    service: Arc<CollectionService>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(err) = service.purge_old_logs().await {
                warn!(target: "plc.api", error = %err, "read_log_purge_failed");
            }
            tokio::select! {
                _ = tokio::time::sleep(PURGE_INTERVAL) => {}
                _ = shutdown.wait_for(|stop| *stop) => break,
            }
        }
        info!(target: "plc.api", "read_log_purge_stopped");
    })
}

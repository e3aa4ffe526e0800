//! 存储接口 Trait 定义
//!
//! - DeviceStore：设备配置
//! - LatestValueStore：设备最新值
//! - ReadLogStore：读取日志
//! - SettingStore：系统配置
//!
//! 所有接口返回 StorageError，使用 async_trait 支持动态分发。

use crate::error::StorageError;
use crate::models::ReadLogRecord;
use async_trait::async_trait;
use domain::{Device, LatestValue, Reading};

/// 设备配置存储接口
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// 列出启用的设备（按地址排序）
    async fn list_enabled_devices(&self) -> Result<Vec<Device>, StorageError>;

    /// 列出全部设备（含禁用）
    async fn list_devices(&self) -> Result<Vec<Device>, StorageError>;

    /// 按名称插入或覆盖设备配置
    async fn upsert_device(&self, device: &Device) -> Result<(), StorageError>;

    /// 修改启用状态，设备不存在时返回 `false`
    async fn set_device_enabled(&self, name: &str, enabled: bool) -> Result<bool, StorageError>;
}

/// 设备最新值存储接口
#[async_trait]
pub trait LatestValueStore: Send + Sync {
    async fn upsert_latest_value(&self, value: &LatestValue) -> Result<(), StorageError>;

    async fn get_latest_value(&self, device_name: &str)
    -> Result<Option<LatestValue>, StorageError>;

    async fn list_latest_values(&self) -> Result<Vec<LatestValue>, StorageError>;
}

/// 读取日志存储接口
#[async_trait]
pub trait ReadLogStore: Send + Sync {
    async fn append_read_log(&self, reading: &Reading) -> Result<(), StorageError>;

    /// 删除早于 `now_ms - days` 的日志，返回删除行数
    async fn purge_logs_older_than(&self, days: u32, now_ms: i64) -> Result<u64, StorageError>;

    /// 最近的日志（时间倒序）
    async fn list_recent_read_logs(&self, limit: u32) -> Result<Vec<ReadLogRecord>, StorageError>;
}

/// 系统配置存储接口
#[async_trait]
pub trait SettingStore: Send + Sync {
    async fn get_setting(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

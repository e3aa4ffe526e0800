//! 设备注册表
//!
//! 启动时从存储加载启用的设备并缓存；之后只有显式 `reload` 才会刷新。

use crate::error::CollectionError;
use domain::Device;
use plc_storage::DeviceStore;
use std::sync::{Arc, RwLock};
use tracing::info;

pub struct DeviceRegistry {
    store: Arc<dyn DeviceStore>,
    devices: RwLock<Arc<Vec<Device>>>,
}

impl DeviceRegistry {
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        Self {
            store,
            devices: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// 从存储重新加载启用设备，返回设备数量。
    pub async fn reload(&self) -> Result<usize, CollectionError> {
        let devices = self.store.list_enabled_devices().await?;
        let count = devices.len();
        let mut guard = self
            .devices
            .write()
            .map_err(|_| CollectionError::Registry("lock failed".to_string()))?;
        *guard = Arc::new(devices);
        info!(target: "plc.collection", devices = count, "device_registry_loaded");
        Ok(count)
    }

    /// 当前设备列表快照，周期内保持不变。
    pub fn snapshot(&self) -> Arc<Vec<Device>> {
        match self.devices.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

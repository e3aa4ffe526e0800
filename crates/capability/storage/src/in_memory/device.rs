//! 设备配置内存存储实现

use crate::error::StorageError;
use crate::traits::DeviceStore;
use domain::Device;
use std::collections::HashMap;
use std::sync::RwLock;

/// 设备配置内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
#[derive(Default)]
pub struct InMemoryDeviceStore {
    devices: RwLock<HashMap<String, Device>>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以给定设备初始化。
    pub fn with_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        let map = devices
            .into_iter()
            .map(|device| (device.name.clone(), device))
            .collect();
        Self {
            devices: RwLock::new(map),
        }
    }

    fn sorted(&self, only_enabled: bool) -> Result<Vec<Device>, StorageError> {
        let map = self
            .devices
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<Device> = map
            .values()
            .filter(|device| !only_enabled || device.enabled)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.address.cmp(&b.address).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }
}

#[async_trait::async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn list_enabled_devices(&self) -> Result<Vec<Device>, StorageError> {
        self.sorted(true)
    }

    async fn list_devices(&self) -> Result<Vec<Device>, StorageError> {
        self.sorted(false)
    }

    async fn upsert_device(&self, device: &Device) -> Result<(), StorageError> {
        let mut map = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        map.insert(device.name.clone(), device.clone());
        Ok(())
    }

    async fn set_device_enabled(&self, name: &str, enabled: bool) -> Result<bool, StorageError> {
        let mut map = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match map.get_mut(name) {
            Some(device) => {
                device.enabled = enabled;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

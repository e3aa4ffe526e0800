//! 系统配置内存存储实现

use crate::error::StorageError;
use crate::traits::SettingStore;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemorySettingStore {
    settings: RwLock<HashMap<String, String>>,
}

impl InMemorySettingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SettingStore for InMemorySettingStore {
    async fn get_setting(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self
            .settings
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self
            .settings
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

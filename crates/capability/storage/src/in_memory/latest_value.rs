//! 最新值内存存储实现

use crate::error::StorageError;
use crate::traits::LatestValueStore;
use domain::LatestValue;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryLatestValueStore {
    values: RwLock<HashMap<String, LatestValue>>,
}

impl InMemoryLatestValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl LatestValueStore for InMemoryLatestValueStore {
    async fn upsert_latest_value(&self, value: &LatestValue) -> Result<(), StorageError> {
        let mut map = self
            .values
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        map.insert(value.device_name.clone(), value.clone());
        Ok(())
    }

    async fn get_latest_value(
        &self,
        device_name: &str,
    ) -> Result<Option<LatestValue>, StorageError> {
        let map = self
            .values
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.get(device_name).cloned())
    }

    async fn list_latest_values(&self) -> Result<Vec<LatestValue>, StorageError> {
        let map = self
            .values
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<LatestValue> = map.values().cloned().collect();
        items.sort_by(|a, b| {
            a.address
                .cmp(&b.address)
                .then_with(|| a.device_name.cmp(&b.device_name))
        });
        Ok(items)
    }
}

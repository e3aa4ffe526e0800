//! 读取日志内存存储实现

use crate::error::StorageError;
use crate::models::{ReadLogRecord, retention_cutoff_ms};
use crate::traits::ReadLogStore;
use domain::Reading;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryReadLogStore {
    records: RwLock<Vec<ReadLogRecord>>,
}

impl InMemoryReadLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前行数。
    pub fn len(&self) -> usize {
        self.records.read().map(|items| items.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ReadLogStore for InMemoryReadLogStore {
    async fn append_read_log(&self, reading: &Reading) -> Result<(), StorageError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let id = records.last().map(|record| record.id + 1).unwrap_or(1);
        records.push(ReadLogRecord {
            id,
            reading: reading.clone(),
        });
        Ok(())
    }

    async fn purge_logs_older_than(&self, days: u32, now_ms: i64) -> Result<u64, StorageError> {
        let cutoff = retention_cutoff_ms(days, now_ms);
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let before = records.len();
        records.retain(|record| record.reading.ts_ms >= cutoff);
        Ok((before - records.len()) as u64)
    }

    async fn list_recent_read_logs(&self, limit: u32) -> Result<Vec<ReadLogRecord>, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<ReadLogRecord> = records.clone();
        items.sort_by(|a, b| {
            b.reading
                .ts_ms
                .cmp(&a.reading.ts_ms)
                .then_with(|| b.id.cmp(&a.id))
        });
        items.truncate(limit as usize);
        Ok(items)
    }
}

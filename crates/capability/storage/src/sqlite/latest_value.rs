//! SQLite 最新值存储实现
//!
//! `device_data` 每个设备一行；`created_time` 只在首次写入时设置。

use super::address_from_column;
use crate::error::StorageError;
use crate::traits::LatestValueStore;
use domain::LatestValue;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

pub struct SqliteLatestValueStore {
    pub pool: SqlitePool,
}

impl SqliteLatestValueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn latest_from_row(row: &SqliteRow) -> Result<LatestValue, StorageError> {
    Ok(LatestValue {
        device_name: row.try_get("device_name")?,
        address: address_from_column(row.try_get("device_address")?)?,
        value: row.try_get("current_value")?,
        updated_at_ms: row.try_get("last_update_time")?,
    })
}

#[async_trait::async_trait]
impl LatestValueStore for SqliteLatestValueStore {
    async fn upsert_latest_value(&self, value: &LatestValue) -> Result<(), StorageError> {
        sqlx::query(
            "insert into device_data (device_name, device_address, current_value, last_update_time, created_time) \
             values (?1, ?2, ?3, ?4, ?4) \
             on conflict(device_name) do update set \
               device_address = excluded.device_address, \
               current_value = excluded.current_value, \
               last_update_time = excluded.last_update_time",
        )
        .bind(&value.device_name)
        .bind(i64::from(value.address))
        .bind(value.value)
        .bind(value.updated_at_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_latest_value(
        &self,
        device_name: &str,
    ) -> Result<Option<LatestValue>, StorageError> {
        let row = sqlx::query(
            "select device_name, device_address, current_value, last_update_time \
             from device_data where device_name = ?1",
        )
        .bind(device_name)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(latest_from_row).transpose()
    }

    async fn list_latest_values(&self) -> Result<Vec<LatestValue>, StorageError> {
        let rows = sqlx::query(
            "select device_name, device_address, current_value, last_update_time \
             from device_data order by device_address, device_name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(latest_from_row).collect()
    }
}

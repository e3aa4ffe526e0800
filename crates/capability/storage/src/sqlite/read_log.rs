//! SQLite 读取日志存储实现

use super::address_from_column;
use crate::error::StorageError;
use crate::models::{ReadLogRecord, retention_cutoff_ms};
use crate::traits::ReadLogStore;
use domain::{ReadOutcome, Reading};
use sqlx::{Row, SqlitePool};

pub struct SqliteReadLogStore {
    pub pool: SqlitePool,
}

impl SqliteReadLogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReadLogStore for SqliteReadLogStore {
    async fn append_read_log(&self, reading: &Reading) -> Result<(), StorageError> {
        sqlx::query(
            "insert into read_log (device_name, device_address, read_value, read_time, status, error_message) \
             values (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&reading.device_name)
        .bind(i64::from(reading.address))
        .bind(reading.value)
        .bind(reading.ts_ms)
        .bind(reading.outcome.as_str())
        .bind(&reading.error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn purge_logs_older_than(&self, days: u32, now_ms: i64) -> Result<u64, StorageError> {
        let result = sqlx::query("delete from read_log where read_time < ?1")
            .bind(retention_cutoff_ms(days, now_ms))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_recent_read_logs(&self, limit: u32) -> Result<Vec<ReadLogRecord>, StorageError> {
        let rows = sqlx::query(
            "select id, device_name, device_address, read_value, read_time, status, error_message \
             from read_log order by read_time desc, id desc limit ?1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let status: String = row.try_get("status")?;
            records.push(ReadLogRecord {
                id: row.try_get("id")?,
                reading: Reading {
                    device_name: row.try_get("device_name")?,
                    address: address_from_column(row.try_get("device_address")?)?,
                    value: row.try_get("read_value")?,
                    ts_ms: row.try_get("read_time")?,
                    outcome: ReadOutcome::parse(&status),
                    error: row.try_get("error_message")?,
                },
            });
        }
        Ok(records)
    }
}

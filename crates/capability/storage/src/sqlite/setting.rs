//! SQLite 系统配置存储实现

use crate::error::StorageError;
use crate::traits::SettingStore;
use domain::now_epoch_ms;
use sqlx::SqlitePool;

pub struct SqliteSettingStore {
    pub pool: SqlitePool,
}

impl SqliteSettingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SettingStore for SqliteSettingStore {
    async fn get_setting(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value =
            sqlx::query_scalar("select config_value from system_config where config_key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            "insert into system_config (config_key, config_value, updated_time) values (?1, ?2, ?3) \
             on conflict(config_key) do update set \
               config_value = excluded.config_value, \
               updated_time = excluded.updated_time",
        )
        .bind(key)
        .bind(value)
        .bind(now_epoch_ms())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

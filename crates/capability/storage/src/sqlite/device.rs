//! SQLite 设备配置存储实现

use super::address_from_column;
use crate::error::StorageError;
use crate::traits::DeviceStore;
use domain::{Device, RegisterDataType};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

pub struct SqliteDeviceStore {
    pub pool: SqlitePool,
}

impl SqliteDeviceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

fn device_from_row(row: &SqliteRow) -> Result<Device, StorageError> {
    let data_type: String = row.try_get("data_type")?;
    Ok(Device {
        name: row.try_get("device_name")?,
        address: address_from_column(row.try_get("address_number")?)?,
        enabled: row.try_get("is_enabled")?,
        description: row.try_get("description")?,
        data_type: RegisterDataType::parse(&data_type).unwrap_or_default(),
    })
}

#[async_trait::async_trait]
impl DeviceStore for SqliteDeviceStore {
    async fn list_enabled_devices(&self) -> Result<Vec<Device>, StorageError> {
        let rows = sqlx::query(
            "select device_name, address_number, is_enabled, description, data_type \
             from device_config where is_enabled = 1 order by address_number, device_name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(device_from_row).collect()
    }

    async fn list_devices(&self) -> Result<Vec<Device>, StorageError> {
        let rows = sqlx::query(
            "select device_name, address_number, is_enabled, description, data_type \
             from device_config order by address_number, device_name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(device_from_row).collect()
    }

    async fn upsert_device(&self, device: &Device) -> Result<(), StorageError> {
        sqlx::query(
            "insert into device_config (device_name, address_number, is_enabled, description, data_type) \
             values (?1, ?2, ?3, ?4, ?5) \
             on conflict(device_name) do update set \
               address_number = excluded.address_number, \
               is_enabled = excluded.is_enabled, \
               description = excluded.description, \
               data_type = excluded.data_type",
        )
        .bind(&device.name)
        .bind(i64::from(device.address))
        .bind(device.enabled)
        .bind(&device.description)
        .bind(device.data_type.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_device_enabled(&self, name: &str, enabled: bool) -> Result<bool, StorageError> {
        let result = sqlx::query("update device_config set is_enabled = ?1 where device_name = ?2")
            .bind(enabled)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

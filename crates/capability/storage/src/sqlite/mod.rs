//! # SQLite 存储实现模块
//!
//! 单文件数据库，四类存储共享同一个 `SqlitePool`。
//!
//! ## 设计要点
//!
//! - 所有 SQL 使用参数绑定（`?1`, `?2` ...）
//! - 写入使用 `insert ... on conflict do update` 实现按主键覆盖
//! - 地址以 `integer` 存储，读出时校验 `u32` 范围
//! - 时间戳统一为 Unix 毫秒

pub mod device;
pub mod latest_value;
pub mod read_log;
pub mod setting;

pub use device::*;
pub use latest_value::*;
pub use read_log::*;
pub use setting::*;

use crate::error::StorageError;

pub(crate) fn address_from_column(value: i64) -> Result<u32, StorageError> {
    u32::try_from(value).map_err(|_| StorageError::new(format!("address out of range: {value}")))
}

//! # PLC Storage 模块
//!
//! 采集服务的持久化抽象层，支持 SQLite 与内存两种后端。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：设备配置、最新值、读取日志、系统配置四类存储接口
//! 2. **数据模型层** (`models.rs`)：读取日志记录与系统配置键
//! 3. **错误处理层** (`error.rs`)：统一的存储错误类型
//! 4. **连接管理层** (`connection.rs`)：SQLite 连接池
//! 5. **模式管理层** (`migrations.rs`)：有序、幂等的建表语句
//! 6. **实现层**：
//!    - `in_memory/`：内存存储实现（测试用）
//!    - `sqlite/`：SQLite 存储实现（单文件数据库，生产使用）
//!
//! ## 数据表
//!
//! - `device_config`：设备配置（名称唯一）
//! - `device_data`：设备最新值，每个设备一行
//! - `read_log`：追加写入的读取日志，按保留天数清理
//! - `system_config`：键值配置
//! - `schema_migrations`：已执行的迁移版本
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use plc_storage::{StoreSet, connect_pool, run_migrations};
//!
//! let pool = connect_pool("sqlite://plc_data.db").await?;
//! run_migrations(&pool).await?;
//! let stores = StoreSet::sqlite(pool);
//! let devices = stores.devices.list_enabled_devices().await?;
//! ```

pub mod connection;
pub mod error;
pub mod in_memory;
pub mod migrations;
pub mod models;
pub mod sqlite;
pub mod traits;

pub use connection::*;
pub use error::*;
pub use migrations::run_migrations;
pub use models::*;
pub use traits::*;

pub use in_memory::{
    InMemoryDeviceStore, InMemoryLatestValueStore, InMemoryReadLogStore, InMemorySettingStore,
};
pub use sqlite::{SqliteDeviceStore, SqliteLatestValueStore, SqliteReadLogStore, SqliteSettingStore};

use std::sync::Arc;

/// 采集服务使用的一组存储句柄。
#[derive(Clone)]
pub struct StoreSet {
    pub devices: Arc<dyn DeviceStore>,
    pub latest_values: Arc<dyn LatestValueStore>,
    pub read_logs: Arc<dyn ReadLogStore>,
    pub settings: Arc<dyn SettingStore>,
}

impl StoreSet {
    /// 内存后端（测试与演示）。
    pub fn in_memory() -> Self {
        Self {
            devices: Arc::new(InMemoryDeviceStore::new()),
            latest_values: Arc::new(InMemoryLatestValueStore::new()),
            read_logs: Arc::new(InMemoryReadLogStore::new()),
            settings: Arc::new(InMemorySettingStore::new()),
        }
    }

    /// SQLite 后端，四个存储共享同一连接池。
    pub fn sqlite(pool: sqlx::SqlitePool) -> Self {
        Self {
            devices: Arc::new(SqliteDeviceStore::new(pool.clone())),
            latest_values: Arc::new(SqliteLatestValueStore::new(pool.clone())),
            read_logs: Arc::new(SqliteReadLogStore::new(pool.clone())),
            settings: Arc::new(SqliteSettingStore::new(pool)),
        }
    }
}

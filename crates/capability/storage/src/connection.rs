//! 数据库连接管理
//!
//! - connect_pool：按 URL 建立 SQLite 连接池（文件不存在时创建）
//! - connect_memory_pool：单连接内存数据库，供测试使用

use crate::error::StorageError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// 建立 SQLite 连接池
///
/// # 参数
/// - `database_url`：例如 `sqlite://plc_data.db`
pub async fn connect_pool(database_url: &str) -> Result<SqlitePool, StorageError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// 建立内存数据库连接池。
///
/// 内存库随连接销毁，因此固定单连接并禁止空闲回收。
pub async fn connect_memory_pool() -> Result<SqlitePool, StorageError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

//! 数据库模式迁移
//!
//! 迁移是有序、幂等的建表语句，执行记录写入 `schema_migrations`。
//! 重复执行只会跳过已记录的版本。

use crate::error::StorageError;
use domain::now_epoch_ms;
use sqlx::SqlitePool;
use tracing::info;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_device_config",
        sql: "create table if not exists device_config (\
                device_name text primary key, \
                address_number integer not null, \
                is_enabled integer not null default 1, \
                description text, \
                data_type text not null default 'uint16')",
    },
    Migration {
        version: 2,
        name: "create_device_data",
        sql: "create table if not exists device_data (\
                device_name text primary key, \
                device_address integer not null, \
                current_value real not null, \
                last_update_time integer not null, \
                created_time integer not null)",
    },
    Migration {
        version: 3,
        name: "create_read_log",
        sql: "create table if not exists read_log (\
                id integer primary key autoincrement, \
                device_name text not null, \
                device_address integer not null, \
                read_value real, \
                read_time integer not null, \
                status text not null, \
                error_message text)",
    },
    Migration {
        version: 4,
        name: "index_read_log_time",
        sql: "create index if not exists idx_read_log_read_time on read_log (read_time)",
    },
    Migration {
        version: 5,
        name: "create_system_config",
        sql: "create table if not exists system_config (\
                config_key text primary key, \
                config_value text not null, \
                updated_time integer not null)",
    },
];

/// 执行尚未记录的迁移，返回本次执行的数量。
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize, StorageError> {
    sqlx::query(
        "create table if not exists schema_migrations (\
           version integer primary key, \
           name text not null, \
           applied_at integer not null)",
    )
    .execute(pool)
    .await?;

    let mut applied = 0;
    for migration in MIGRATIONS {
        let exists: Option<i64> =
            sqlx::query_scalar("select version from schema_migrations where version = ?1")
                .bind(migration.version)
                .fetch_optional(pool)
                .await?;
        if exists.is_some() {
            continue;
        }

        let mut tx = pool.begin().await?;
        sqlx::query(migration.sql).execute(&mut *tx).await?;
        sqlx::query(
            "insert into schema_migrations (version, name, applied_at) values (?1, ?2, ?3)",
        )
        .bind(migration.version)
        .bind(migration.name)
        .bind(now_epoch_ms())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(
            version = migration.version,
            name = migration.name,
            "schema_migration_applied"
        );
        applied += 1;
    }
    Ok(applied)
}

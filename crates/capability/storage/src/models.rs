//! 数据模型
//!
//! - ReadLogRecord：读取日志行（带自增 ID）
//! - 系统配置键（`system_config` 表）

use domain::Reading;

/// 读取日志记录。
#[derive(Debug, Clone, PartialEq)]
pub struct ReadLogRecord {
    pub id: i64,
    pub reading: Reading,
}

/// PLC 主机地址
pub const SETTING_PLC_HOST: &str = "plc_ip_address";
/// PLC 端口
pub const SETTING_PLC_PORT: &str = "plc_port";
/// 轮询间隔（秒）
pub const SETTING_READ_INTERVAL: &str = "read_interval_seconds";
/// 读取日志保留天数
pub const SETTING_LOG_RETENTION_DAYS: &str = "log_retention_days";

/// 毫秒/天
pub const DAY_MS: i64 = 86_400_000;

/// 保留 `days` 天时的清理截止时间（早于该时间的日志被删除）。
pub fn retention_cutoff_ms(days: u32, now_ms: i64) -> i64 {
    now_ms.saturating_sub(i64::from(days).saturating_mul(DAY_MS))
}

pub mod data;

pub use data::{Device, LatestValue, ReadOutcome, Reading, RegisterDataType};

/// PLC 连接状态（由协议客户端独占维护）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub connected: bool,
    pub host: String,
    pub port: u16,
    pub status_message: String,
}

impl ConnectionState {
    /// 尚未连接时的初始状态。
    pub fn disconnected(host: impl Into<String>, port: u16) -> Self {
        Self {
            connected: false,
            host: host.into(),
            port,
            status_message: "disconnected".to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 采集运行状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionRunState {
    pub running: bool,
    pub interval_seconds: u64,
}

impl Default for CollectionRunState {
    fn default() -> Self {
        Self {
            running: false,
            interval_seconds: 5,
        }
    }
}

/// 设备数据新鲜度分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// 最近窗口内有成功读取
    Fresh,
    /// 有历史值，但超出窗口
    Stale,
    /// 从未成功读取
    Unknown,
}

impl Liveness {
    /// 根据最后更新时间计算新鲜度。
    ///
    /// 晚于 `now_ms` 的时间（时钟回拨）视为刚刚更新。
    pub fn classify(updated_at_ms: Option<i64>, now_ms: i64, fresh_window_ms: i64) -> Self {
        match updated_at_ms {
            None => Self::Unknown,
            Some(ts) if now_ms.saturating_sub(ts) <= fresh_window_ms => Self::Fresh,
            Some(_) => Self::Stale,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Stale => "stale",
            Self::Unknown => "unknown",
        }
    }
}

/// 设备状态查询视图（设备配置 + 最新值 + 新鲜度）。
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
    pub name: String,
    pub address: u32,
    pub description: Option<String>,
    pub value: Option<f64>,
    pub updated_at_ms: Option<i64>,
    pub enabled: bool,
    pub liveness: Liveness,
}

/// 获取当前时间戳（毫秒）。
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

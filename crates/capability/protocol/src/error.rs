//! 协议错误类型定义

/// 协议通信错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// 尚未建立连接
    #[error("not connected")]
    NotConnected,

    /// 传输层错误（连接被重置、帧错误等）
    #[error("transport error: {0}")]
    Transport(String),

    /// 超时错误
    #[error("timeout: {0}")]
    Timeout(String),

    /// 从站返回的 Modbus 异常响应
    #[error("modbus exception: {0}")]
    Exception(String),

    /// 无法映射到 Modbus 地址空间
    #[error("invalid register address: {0}")]
    InvalidAddress(u32),

    /// 配置解析错误
    #[error("config parse error: {0}")]
    ConfigParse(String),
}

impl ProtocolError {
    /// 是否意味着当前会话已不可用（需要重连）。
    pub fn breaks_session(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}

//! 协议相关类型定义

use crate::error::ProtocolError;

/// Modbus TCP 连接配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModbusTcpConfig {
    /// PLC 主机地址（IP 或主机名）
    pub host: String,
    /// 端口（默认 502）
    pub port: u16,
    /// 从站 ID
    pub unit_id: u8,
    /// 连接超时（毫秒）
    pub connect_timeout_ms: u64,
    /// 单次寄存器操作超时（毫秒）
    pub read_timeout_ms: u64,
}

impl Default for ModbusTcpConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.2".to_string(),
            port: 502,
            unit_id: 1,
            connect_timeout_ms: 3000,
            read_timeout_ms: 3000,
        }
    }
}

impl ModbusTcpConfig {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 将逻辑寄存器地址映射为 Modbus PDU 地址（直接映射）。
pub fn to_wire_address(address: u32) -> Result<u16, ProtocolError> {
    u16::try_from(address).map_err(|_| ProtocolError::InvalidAddress(address))
}

/// 解析 `D802` / `d802` / `802` 形式的寄存器地址。
pub fn parse_register_address(value: &str) -> Result<u32, ProtocolError> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix('D')
        .or_else(|| trimmed.strip_prefix('d'))
        .unwrap_or(trimmed);
    digits
        .parse::<u32>()
        .map_err(|_| ProtocolError::ConfigParse(format!("invalid register address: {value}")))
}

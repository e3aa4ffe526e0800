//! 输入验证辅助函数

use crate::utils::response::bad_request_error;
use axum::response::Response;
use plc_protocol::{parse_register_address, to_wire_address};

/// 读取日志默认返回条数
pub const DEFAULT_READ_LOG_LIMIT: u32 = 100;
/// 读取日志单次最大返回条数
pub const MAX_READ_LOG_LIMIT: u32 = 1000;

/// 解析路径中的寄存器地址（`D802` 或 `802`），必须落在 Modbus 地址空间内
pub fn parse_address_param(value: &str) -> Result<u32, Response> {
    let address = parse_register_address(value)
        .map_err(|err| bad_request_error("INVALID.ADDRESS", err.to_string()))?;
    to_wire_address(address).map_err(|err| bad_request_error("INVALID.ADDRESS", err.to_string()))?;
    Ok(address)
}

pub fn normalize_limit(limit: Option<u32>) -> u32 {
    match limit {
        None | Some(0) => DEFAULT_READ_LOG_LIMIT,
        Some(limit) => limit.min(MAX_READ_LOG_LIMIT),
    }
}

/// 验证必填字段，去除空格并检查非空
pub fn normalize_required(value: &str, field: &str) -> Result<String, Response> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(bad_request_error("INVALID.REQUEST", format!("{field} required")));
    }
    Ok(trimmed.to_string())
}

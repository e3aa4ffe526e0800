//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 采集服务运行配置。
///
/// 端点与轮询间隔只是默认值，启动后会被 `system_config` 中的存储值覆盖。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub database_url: String,
    pub plc_host: String,
    pub plc_port: u16,
    pub plc_unit_id: u8,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub poll_interval_seconds: u64,
    pub error_cooldown_seconds: u64,
    pub persist_retries: u32,
    pub log_retention_days: u32,
    pub fresh_window_seconds: u64,
    pub shutdown_grace_seconds: u64,
    pub autostart: bool,
    pub devices_file: Option<String>,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr = env::var("PLC_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let database_url =
            env::var("PLC_DATABASE_URL").unwrap_or_else(|_| "sqlite://plc_data.db".to_string());
        let plc_host = env::var("PLC_HOST").unwrap_or_else(|_| "192.168.1.2".to_string());
        let plc_port = read_u16_with_default("PLC_PORT", 502)?;
        let plc_unit_id = read_u8_with_default("PLC_UNIT_ID", 1)?;
        let connect_timeout_ms = read_u64_with_default("PLC_CONNECT_TIMEOUT_MS", 3000)?;
        let read_timeout_ms = read_u64_with_default("PLC_READ_TIMEOUT_MS", 3000)?;
        let poll_interval_seconds = read_u64_with_default("PLC_POLL_INTERVAL_SECONDS", 5)?;
        if poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "PLC_POLL_INTERVAL_SECONDS".to_string(),
                "0".to_string(),
            ));
        }
        let error_cooldown_seconds = read_u64_with_default("PLC_ERROR_COOLDOWN_SECONDS", 10)?;
        let persist_retries = read_u32_with_default("PLC_PERSIST_RETRIES", 1)?;
        let log_retention_days = read_u32_with_default("PLC_LOG_RETENTION_DAYS", 30)?;
        let fresh_window_seconds = read_u64_with_default("PLC_FRESH_WINDOW_SECONDS", 600)?;
        let shutdown_grace_seconds = read_u64_with_default("PLC_SHUTDOWN_GRACE_SECONDS", 5)?;
        let autostart = read_bool_with_default("PLC_AUTOSTART", true);
        let devices_file = read_optional("PLC_DEVICES_FILE");

        Ok(Self {
            http_addr,
            database_url,
            plc_host,
            plc_port,
            plc_unit_id,
            connect_timeout_ms,
            read_timeout_ms,
            poll_interval_seconds,
            error_cooldown_seconds,
            persist_retries,
            log_retention_days,
            fresh_window_seconds,
            shutdown_grace_seconds,
            autostart,
            devices_file,
        })
    }
}

/// 寄存器模拟器配置。
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub listen_addr: String,
    /// 随机变化周期（毫秒）
    pub tick_ms: u64,
}

impl SimulatorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = env::var("PLC_SIM_ADDR").unwrap_or_else(|_| "0.0.0.0:5020".to_string());
        let tick_ms = read_u64_with_default("PLC_SIM_TICK_MS", 1000)?;
        Ok(Self {
            listen_addr,
            tick_ms,
        })
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u8_with_default(key: &str, default: u8) -> Result<u8, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u8>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}

/// 寄存器值的解码方式。
///
/// 寄存器在线路上始终是无符号 16 位字，`Int16` 仅影响解码后的数值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterDataType {
    #[default]
    Uint16,
    Int16,
}

impl RegisterDataType {
    /// 将原始寄存器字解码为数值。
    pub fn decode(self, raw: u16) -> f64 {
        match self {
            Self::Uint16 => f64::from(raw),
            Self::Int16 => f64::from(raw as i16),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "uint16" | "u16" => Some(Self::Uint16),
            "int16" | "i16" => Some(Self::Int16),
            _ => None,
        }
    }
}

/// 采集设备配置。
///
/// 名称唯一；运行期间只通过配置更新修改，从不删除（禁用即移除）。
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub name: String,
    /// 逻辑寄存器地址（D 区编号，直接映射到 Modbus 地址）
    pub address: u32,
    pub enabled: bool,
    pub description: Option<String>,
    pub data_type: RegisterDataType,
}

impl Device {
    pub fn new(name: impl Into<String>, address: u32) -> Self {
        Self {
            name: name.into(),
            address,
            enabled: true,
            description: None,
            data_type: RegisterDataType::default(),
        }
    }

    /// 展示用地址，例如 `D802`。
    pub fn display_address(&self) -> String {
        format!("D{}", self.address)
    }
}

/// 单次读取结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Success,
    Failure,
}

impl ReadOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("success") {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

/// 一次周期内对单个设备的读取记录（追加写入读取日志）。
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub device_name: String,
    pub address: u32,
    /// 失败时为空
    pub value: Option<f64>,
    pub ts_ms: i64,
    pub outcome: ReadOutcome,
    pub error: Option<String>,
}

impl Reading {
    pub fn success(device: &Device, value: f64, ts_ms: i64) -> Self {
        Self {
            device_name: device.name.clone(),
            address: device.address,
            value: Some(value),
            ts_ms,
            outcome: ReadOutcome::Success,
            error: None,
        }
    }

    pub fn failure(device: &Device, error: impl Into<String>, ts_ms: i64) -> Self {
        Self {
            device_name: device.name.clone(),
            address: device.address,
            value: None,
            ts_ms,
            outcome: ReadOutcome::Failure,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == ReadOutcome::Success
    }
}

/// 设备最新值（每个设备一行，仅在读取成功时覆盖）。
#[derive(Debug, Clone, PartialEq)]
pub struct LatestValue {
    pub device_name: String,
    pub address: u32,
    pub value: f64,
    pub updated_at_ms: i64,
}

//! 内存存储实现模块
//!
//! 仅用于测试和无数据库演示。
//!
//! 包含以下实现：
//! - DeviceStore: InMemoryDeviceStore
//! - LatestValueStore: InMemoryLatestValueStore
//! - ReadLogStore: InMemoryReadLogStore
//! - SettingStore: InMemorySettingStore

pub mod device;
pub mod latest_value;
pub mod read_log;
pub mod setting;

pub use device::*;
pub use latest_value::*;
pub use read_log::*;
pub use setting::*;

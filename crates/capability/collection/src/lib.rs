//! # 采集循环能力模块
//!
//! 按固定周期轮询 PLC 寄存器，持久化结果并通知观察者。
//!
//! ## 架构设计
//!
//! ```text
//! sleep(interval) / Notify(start) / watch(shutdown)
//!       │  select!
//!       ▼
//! CollectionService::trigger_cycle  ── try_lock(cycle) 失败则跳过
//!       │
//!       ├── RegisterClient::connect / read_register
//!       ├── DeviceRegistry::snapshot（仅启用设备）
//!       ├── LatestValueStore + ReadLogStore（按设备并发写入）
//!       └── EventSink（broadcast：CycleCompleted / ConnectionChanged）
//! ```
//!
//! ## 并发约束
//!
//! - 同一时刻最多执行一个周期：周期互斥锁使用 `try_lock`，并发请求直接跳过
//! - 运行状态、连接状态、周期执行使用三把独立的锁
//! - 周期在循环持有的 `JoinSet` 中执行：panic 被捕获后进入冷却等待（长于正常间隔）
//! - 单个设备的传输错误只丢弃当前会话，下一个设备前重连一次
//! - 只有 stop / shutdown 会结束后台循环

mod error;
pub mod events;
pub mod registry;
mod service;
pub mod status;

pub use error::CollectionError;
pub use events::{CollectionEvent, ConnectionChange, CycleReport, EventSink};
pub use registry::DeviceRegistry;
pub use service::{CollectionConfig, CollectionService};
pub use status::{CollectionStatus, device_statuses};

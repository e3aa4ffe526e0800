//! # 协议通信能力模块
//!
//! 为采集循环提供最小化的 PLC 寄存器访问能力：
//! - **RegisterClient**：连接、断开、单寄存器读写的异步接口
//! - **ModbusTcpClient**：基于 tokio-modbus 的 Modbus TCP 实现
//! - **RegisterBank**：Modbus TCP 保持寄存器模拟器（联调与集成测试）
//!
//! ## 架构设计
//!
//! ```text
//! CollectionService
//!       │
//!       ▼
//! RegisterClient (trait)
//!       │
//!       └── ModbusTcpClient ──TCP──▶ PLC / RegisterBank
//! ```
//!
//! ## 地址映射
//!
//! 逻辑地址 `D802` 直接映射为 Modbus PDU 地址 `802`（功能码 0x03 / 0x06）。
//! 超出 `u16` 范围的地址返回 [`ProtocolError::InvalidAddress`]。

mod client;
mod error;
mod modbus_tcp;
pub mod simulator;
mod types;

pub use client::RegisterClient;
pub use error::ProtocolError;
pub use modbus_tcp::ModbusTcpClient;
pub use types::*;

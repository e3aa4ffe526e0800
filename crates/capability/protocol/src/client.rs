//! 寄存器客户端抽象

use crate::error::ProtocolError;
use async_trait::async_trait;
use domain::ConnectionState;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// PLC 寄存器客户端。
///
/// 实现方持有唯一的网络连接，寄存器操作在内部串行化；
/// 连接状态查询不得阻塞在进行中的寄存器操作之后。
#[async_trait]
pub trait RegisterClient: Send + Sync {
    /// 更新连接目标，下次 `connect` 生效；`timeout_ms` 为空时保留原超时。
    fn configure(&self, host: &str, port: u16, timeout_ms: Option<u64>);

    /// 关闭旧连接并建立新连接；任何网络错误或超时都返回 `false`。
    async fn connect(&self) -> bool;

    fn is_connected(&self) -> bool;

    fn connection_state(&self) -> ConnectionState;

    /// 读取单个保持寄存器（功能码 0x03）。
    async fn read_register(&self, address: u32) -> Result<u16, ProtocolError>;

    /// 尽力批量读取：失败的地址不出现在结果中。
    ///
    /// 会话被单个地址的超时丢弃时重连一次，重连失败则放弃剩余地址。
    async fn read_registers(&self, addresses: &[u32]) -> BTreeMap<u32, u16> {
        let mut values = BTreeMap::new();
        if !self.is_connected() {
            warn!(
                target: "plc.protocol",
                count = addresses.len(),
                "read_registers_skipped_not_connected"
            );
            return values;
        }
        for &address in addresses {
            match self.read_register(address).await {
                Ok(value) => {
                    values.insert(address, value);
                }
                Err(err) => {
                    debug!(
                        target: "plc.protocol",
                        address,
                        error = %err,
                        "read_registers_entry_failed"
                    );
                    // 超时或传输错误会丢弃会话：重连一次后继续读取剩余地址
                    if err.breaks_session() && !self.is_connected() && !self.connect().await {
                        warn!(
                            target: "plc.protocol",
                            address,
                            "read_registers_reconnect_failed"
                        );
                        break;
                    }
                }
            }
        }
        values
    }

    /// 写单个保持寄存器（功能码 0x06），失败返回 `false`。
    async fn write_register(&self, address: u32, value: u16) -> bool;

    /// 断开连接，可重复调用。
    async fn disconnect(&self);
}

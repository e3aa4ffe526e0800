//! 采集事件通知
//!
//! 基于 `tokio::sync::broadcast`：发布从不等待接收方，
//! 落后的接收方丢失最旧的事件（`RecvError::Lagged`）。

use std::collections::BTreeMap;
use tokio::sync::broadcast;

/// 一次采集周期的结果。
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle_id: String,
    pub started_at_ms: i64,
    pub finished_at_ms: i64,
    /// 设备名 -> 解码后的数值（仅成功读取）
    pub values: BTreeMap<String, f64>,
    pub errors: Vec<String>,
    /// 无错误且至少一个设备读取成功
    pub success: bool,
    pub connected: bool,
}

/// 连接状态变化。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionChange {
    pub connected: bool,
    pub status_message: String,
    pub ts_ms: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionEvent {
    CycleCompleted(CycleReport),
    ConnectionChanged(ConnectionChange),
}

/// 事件发布端，由采集服务持有。
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: broadcast::Sender<CollectionEvent>,
}

impl EventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent> {
        self.sender.subscribe()
    }

    /// 发布事件；没有订阅者时直接丢弃。
    pub fn publish(&self, event: CollectionEvent) {
        let _ = self.sender.send(event);
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventSink {
    fn default() -> Self {
        Self::new(64)
    }
}

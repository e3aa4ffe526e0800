//! Modbus TCP 客户端实现
//!
//! 单连接、寄存器操作串行化。连接状态放在独立的短锁中，
//! 状态查询不会等待进行中的读写。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let client = ModbusTcpClient::new(ModbusTcpConfig {
//!     host: "192.168.1.2".to_string(),
//!     ..ModbusTcpConfig::default()
//! });
//! if client.connect().await {
//!     let value = client.read_register(802).await?;
//! }
//! ```

use crate::client::RegisterClient;
use crate::error::ProtocolError;
use crate::types::{ModbusTcpConfig, to_wire_address};
use async_trait::async_trait;
use domain::ConnectionState;
use std::net::SocketAddr;
use std::sync::{Mutex, RwLock};
use std::time::Duration;
use tokio::time::{error::Elapsed, timeout};
use tokio_modbus::client::Context;
use tokio_modbus::prelude::*;
use tracing::{debug, info, warn};

/// Modbus TCP 寄存器客户端
pub struct ModbusTcpClient {
    config: Mutex<ModbusTcpConfig>,
    /// I/O 锁：同一时刻只有一个寄存器操作占用连接
    session: tokio::sync::Mutex<Option<Context>>,
    state: RwLock<ConnectionState>,
}

impl ModbusTcpClient {
    pub fn new(config: ModbusTcpConfig) -> Self {
        let state = ConnectionState::disconnected(config.host.clone(), config.port);
        Self {
            config: Mutex::new(config),
            session: tokio::sync::Mutex::new(None),
            state: RwLock::new(state),
        }
    }

    /// 当前配置快照。
    pub fn config(&self) -> ModbusTcpConfig {
        match self.config.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_state(&self, next: ConnectionState) {
        match self.state.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    fn mark_disconnected(&self, message: impl Into<String>) {
        let config = self.config();
        self.set_state(ConnectionState {
            connected: false,
            host: config.host,
            port: config.port,
            status_message: message.into(),
        });
    }

    async fn resolve(config: &ModbusTcpConfig) -> Result<SocketAddr, ProtocolError> {
        let mut addrs = tokio::net::lookup_host((config.host.as_str(), config.port))
            .await
            .map_err(|e| ProtocolError::Transport(format!("resolve {}: {e}", config.endpoint())))?;
        addrs.next().ok_or_else(|| {
            ProtocolError::Transport(format!("resolve {}: no address", config.endpoint()))
        })
    }

    async fn open(config: &ModbusTcpConfig) -> Result<Context, ProtocolError> {
        let addr = Self::resolve(config).await?;
        let limit = Duration::from_millis(config.connect_timeout_ms);
        match timeout(limit, tcp::connect_slave(addr, Slave(config.unit_id))).await {
            Ok(Ok(ctx)) => Ok(ctx),
            Ok(Err(e)) => Err(ProtocolError::Transport(e.to_string())),
            Err(_) => Err(ProtocolError::Timeout(format!(
                "connect {} after {}ms",
                config.endpoint(),
                config.connect_timeout_ms
            ))),
        }
    }

    /// 展开 timeout + 传输错误 + 异常码三层结果。
    fn flatten<T>(
        result: Result<tokio_modbus::Result<T>, Elapsed>,
        op: &str,
        timeout_ms: u64,
    ) -> Result<T, ProtocolError> {
        match result {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(code))) => Err(ProtocolError::Exception(format!("{code:?}"))),
            Ok(Err(e)) => Err(ProtocolError::Transport(e.to_string())),
            Err(_) => Err(ProtocolError::Timeout(format!("{op} after {timeout_ms}ms"))),
        }
    }

    /// 会话不可用时丢弃连接，后续 `is_connected` 返回 false。
    fn drop_broken_session(&self, session: &mut Option<Context>, err: &ProtocolError) {
        if err.breaks_session() {
            session.take();
            self.mark_disconnected(err.to_string());
            warn!(target: "plc.protocol", error = %err, "plc_session_dropped");
        }
    }
}

#[async_trait]
impl RegisterClient for ModbusTcpClient {
    fn configure(&self, host: &str, port: u16, timeout_ms: Option<u64>) {
        {
            let mut config = match self.config.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            config.host = host.to_string();
            config.port = port;
            if let Some(ms) = timeout_ms {
                config.connect_timeout_ms = ms;
                config.read_timeout_ms = ms;
            }
        }
        if !self.is_connected() {
            self.mark_disconnected("disconnected");
        }
        info!(target: "plc.protocol", host, port, "plc_endpoint_configured");
    }

    async fn connect(&self) -> bool {
        let config = self.config();
        let mut session = self.session.lock().await;
        if let Some(mut ctx) = session.take() {
            let _ = ctx.disconnect().await;
        }

        match Self::open(&config).await {
            Ok(ctx) => {
                *session = Some(ctx);
                self.set_state(ConnectionState {
                    connected: true,
                    host: config.host.clone(),
                    port: config.port,
                    status_message: format!("connected to {}", config.endpoint()),
                });
                info!(
                    target: "plc.protocol",
                    endpoint = %config.endpoint(),
                    unit_id = config.unit_id,
                    "plc_connected"
                );
                true
            }
            Err(err) => {
                self.mark_disconnected(err.to_string());
                warn!(
                    target: "plc.protocol",
                    endpoint = %config.endpoint(),
                    error = %err,
                    "plc_connect_failed"
                );
                false
            }
        }
    }

    fn is_connected(&self) -> bool {
        match self.state.read() {
            Ok(guard) => guard.connected,
            Err(poisoned) => poisoned.into_inner().connected,
        }
    }

    fn connection_state(&self) -> ConnectionState {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn read_register(&self, address: u32) -> Result<u16, ProtocolError> {
        let wire = to_wire_address(address)?;
        let timeout_ms = self.config().read_timeout_ms;
        let mut session = self.session.lock().await;
        let Some(ctx) = session.as_mut() else {
            return Err(ProtocolError::NotConnected);
        };

        let result = timeout(
            Duration::from_millis(timeout_ms),
            ctx.read_holding_registers(wire, 1),
        )
        .await;
        match Self::flatten(result, "read", timeout_ms) {
            Ok(words) => {
                let value = words.first().copied().ok_or_else(|| {
                    ProtocolError::Exception(format!("empty response for {address}"))
                })?;
                debug!(target: "plc.protocol", address, value, "plc_register_read");
                Ok(value)
            }
            Err(err) => {
                self.drop_broken_session(&mut session, &err);
                warn!(target: "plc.protocol", address, error = %err, "plc_read_failed");
                Err(err)
            }
        }
    }

    async fn write_register(&self, address: u32, value: u16) -> bool {
        let wire = match to_wire_address(address) {
            Ok(wire) => wire,
            Err(err) => {
                warn!(target: "plc.protocol", address, error = %err, "plc_write_failed");
                return false;
            }
        };
        let timeout_ms = self.config().read_timeout_ms;
        let mut session = self.session.lock().await;
        let Some(ctx) = session.as_mut() else {
            warn!(target: "plc.protocol", address, "plc_write_not_connected");
            return false;
        };

        let result = timeout(
            Duration::from_millis(timeout_ms),
            ctx.write_single_register(wire, value),
        )
        .await;
        match Self::flatten(result, "write", timeout_ms) {
            Ok(()) => {
                info!(target: "plc.protocol", address, value, "plc_register_written");
                true
            }
            Err(err) => {
                self.drop_broken_session(&mut session, &err);
                warn!(target: "plc.protocol", address, error = %err, "plc_write_failed");
                false
            }
        }
    }

    async fn disconnect(&self) {
        let mut session = self.session.lock().await;
        if let Some(mut ctx) = session.take() {
            let _ = ctx.disconnect().await;
            info!(target: "plc.protocol", "plc_disconnected");
        }
        self.mark_disconnected("disconnected");
    }
}

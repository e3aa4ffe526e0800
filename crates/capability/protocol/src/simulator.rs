//! Modbus TCP 保持寄存器模拟器
//!
//! 只实现采集所需的功能码：
//! - 0x03 读保持寄存器
//! - 0x06 写单个寄存器
//! - 0x10 写多个寄存器
//!
//! 访问未定义的寄存器返回 `IllegalDataAddress`，其他功能码返回 `IllegalFunction`。

use std::collections::HashMap;
use std::future;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_modbus::prelude::*;
use tokio_modbus::server::tcp::{Server, accept_tcp_connection};
use tracing::{debug, info, warn};

/// 共享的保持寄存器表，克隆后指向同一份数据。
#[derive(Debug, Clone, Default)]
pub struct RegisterBank {
    registers: Arc<Mutex<HashMap<u16, u16>>>,
}

impl RegisterBank {
    pub fn new() -> Self {
        Self::default()
    }

    fn registers(&self) -> MutexGuard<'_, HashMap<u16, u16>> {
        match self.registers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn set(&self, address: u16, value: u16) {
        self.registers().insert(address, value);
    }

    pub fn get(&self, address: u16) -> Option<u16> {
        self.registers().get(&address).copied()
    }

    pub fn remove(&self, address: u16) -> Option<u16> {
        self.registers().remove(&address)
    }

    /// 已定义的寄存器地址（升序）。
    pub fn addresses(&self) -> Vec<u16> {
        let mut addresses: Vec<u16> = self.registers().keys().copied().collect();
        addresses.sort_unstable();
        addresses
    }

    fn read(&self, addr: u16, cnt: u16) -> Result<Vec<u16>, ExceptionCode> {
        let registers = self.registers();
        (0..cnt)
            .map(|offset| {
                addr.checked_add(offset)
                    .and_then(|a| registers.get(&a).copied())
                    .ok_or(ExceptionCode::IllegalDataAddress)
            })
            .collect()
    }

    fn write(&self, addr: u16, values: &[u16]) -> Result<(), ExceptionCode> {
        let mut registers = self.registers();
        let mut targets = Vec::with_capacity(values.len());
        for (offset, value) in values.iter().enumerate() {
            let target = u16::try_from(offset)
                .ok()
                .and_then(|o| addr.checked_add(o))
                .filter(|a| registers.contains_key(a))
                .ok_or(ExceptionCode::IllegalDataAddress)?;
            targets.push((target, *value));
        }
        registers.extend(targets);
        Ok(())
    }

    /// 在给定监听器上提供 Modbus TCP 服务，直到监听器出错。
    pub async fn serve(self, listener: TcpListener) -> io::Result<()> {
        let server = Server::new(listener);
        let bank = self;
        let on_connected = move |stream, socket_addr| {
            let bank = bank.clone();
            async move {
                debug!(target: "plc.protocol", peer = %socket_addr, "simulator_client_connected");
                accept_tcp_connection(stream, socket_addr, move |_socket_addr| {
                    Ok(Some(bank.clone()))
                })
            }
        };
        let on_process_error = |err| {
            warn!(target: "plc.protocol", error = %err, "simulator_process_error");
        };
        server.serve(&on_connected, on_process_error).await.map(|_| ())
    }
}

impl tokio_modbus::server::Service for RegisterBank {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = future::Ready<Result<Self::Response, Self::Exception>>;

    fn call(&self, req: Self::Request) -> Self::Future {
        let res = match req {
            Request::ReadHoldingRegisters(addr, cnt) => {
                self.read(addr, cnt).map(Response::ReadHoldingRegisters)
            }
            Request::WriteSingleRegister(addr, value) => self
                .write(addr, std::slice::from_ref(&value))
                .map(|_| Response::WriteSingleRegister(addr, value)),
            Request::WriteMultipleRegisters(addr, values) => {
                let count = values.len() as u16;
                self.write(addr, &values)
                    .map(|_| Response::WriteMultipleRegisters(addr, count))
            }
            other => {
                debug!(target: "plc.protocol", request = ?other, "simulator_unsupported_function");
                Err(ExceptionCode::IllegalFunction)
            }
        };
        future::ready(res)
    }
}

/// 在 `addr` 上启动模拟器任务，返回实际监听地址（端口 0 时由系统分配）。
pub async fn spawn(
    bank: RegisterBank,
    addr: SocketAddr,
) -> io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(target: "plc.protocol", addr = %local, "simulator_listening");
    let handle = tokio::spawn(async move {
        if let Err(err) = bank.serve(listener).await {
            warn!(target: "plc.protocol", error = %err, "simulator_stopped");
        }
    });
    Ok((local, handle))
}

#![allow(dead_code)]

use async_trait::async_trait;
use domain::{ConnectionState, Device, LatestValue, Reading};
use plc_collection::{CollectionConfig, CollectionEvent, CollectionService, CycleReport};
use plc_protocol::{ProtocolError, RegisterClient};
use plc_storage::{
    InMemoryLatestValueStore, LatestValueStore, ReadLogRecord, ReadLogStore, StorageError,
    StoreSet,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

/// 可编程的寄存器客户端：记录并发峰值，可模拟慢读、断线与 panic。
pub struct FakeClient {
    values: Mutex<HashMap<u32, u16>>,
    endpoint: Mutex<(String, u16)>,
    connected: AtomicBool,
    reachable: AtomicBool,
    read_delay: Duration,
    lose_connection_at: Mutex<Option<u32>>,
    stay_down_after_loss: AtomicBool,
    panic_next_read: AtomicBool,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    reads: AtomicUsize,
    connects: AtomicUsize,
}

impl FakeClient {
    pub fn new(values: impl IntoIterator<Item = (u32, u16)>) -> Self {
        Self {
            values: Mutex::new(values.into_iter().collect()),
            endpoint: Mutex::new(("127.0.0.1".to_string(), 502)),
            connected: AtomicBool::new(false),
            reachable: AtomicBool::new(true),
            read_delay: Duration::ZERO,
            lose_connection_at: Mutex::new(None),
            stay_down_after_loss: AtomicBool::new(false),
            panic_next_read: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            connects: AtomicUsize::new(0),
        }
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn set_value(&self, address: u32, value: u16) {
        self.values.lock().unwrap().insert(address, value);
    }

    pub fn remove_value(&self, address: u32) {
        self.values.lock().unwrap().remove(&address);
    }

    pub fn lose_connection_at(&self, address: u32) {
        *self.lose_connection_at.lock().unwrap() = Some(address);
    }

    /// 读取 `address` 时断线，且之后无法重连。
    pub fn go_down_at(&self, address: u32) {
        self.lose_connection_at(address);
        self.stay_down_after_loss.store(true, Ordering::SeqCst);
    }

    pub fn panic_on_next_read(&self) {
        self.panic_next_read.store(true, Ordering::SeqCst);
    }

    pub fn endpoint(&self) -> (String, u16) {
        self.endpoint.lock().unwrap().clone()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn is_connected_now(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegisterClient for FakeClient {
    fn configure(&self, host: &str, port: u16, _timeout_ms: Option<u64>) {
        *self.endpoint.lock().unwrap() = (host.to_string(), port);
    }

    async fn connect(&self) -> bool {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let ok = self.reachable.load(Ordering::SeqCst);
        self.connected.store(ok, Ordering::SeqCst);
        ok
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn connection_state(&self) -> ConnectionState {
        let (host, port) = self.endpoint();
        let connected = self.is_connected();
        ConnectionState {
            connected,
            status_message: if connected {
                format!("connected to {host}:{port}")
            } else {
                "connection refused".to_string()
            },
            host,
            port,
        }
    }

    async fn read_register(&self, address: u32) -> Result<u16, ProtocolError> {
        if !self.is_connected() {
            return Err(ProtocolError::NotConnected);
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.reads.fetch_add(1, Ordering::SeqCst);

        if self.panic_next_read.swap(false, Ordering::SeqCst) {
            panic!("simulated driver panic");
        }
        if *self.lose_connection_at.lock().unwrap() == Some(address) {
            self.connected.store(false, Ordering::SeqCst);
            if self.stay_down_after_loss.load(Ordering::SeqCst) {
                self.set_reachable(false);
            }
            return Err(ProtocolError::Transport("connection reset".to_string()));
        }
        self.values
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .ok_or_else(|| ProtocolError::Exception("IllegalDataAddress".to_string()))
    }

    async fn write_register(&self, address: u32, value: u16) -> bool {
        if !self.is_connected() {
            return false;
        }
        self.set_value(address, value);
        true
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

/// 前 `failures` 次写入失败的最新值存储。
pub struct FlakyLatestValueStore {
    inner: InMemoryLatestValueStore,
    failures: AtomicUsize,
    attempts: AtomicUsize,
}

impl FlakyLatestValueStore {
    pub fn new(failures: usize) -> Self {
        Self {
            inner: InMemoryLatestValueStore::new(),
            failures: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LatestValueStore for FlakyLatestValueStore {
    async fn upsert_latest_value(&self, value: &LatestValue) -> Result<(), StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StorageError::new("database is locked"));
        }
        self.inner.upsert_latest_value(value).await
    }

    async fn get_latest_value(
        &self,
        device_name: &str,
    ) -> Result<Option<LatestValue>, StorageError> {
        self.inner.get_latest_value(device_name).await
    }

    async fn list_latest_values(&self) -> Result<Vec<LatestValue>, StorageError> {
        self.inner.list_latest_values().await
    }
}

/// 总是写入失败的读取日志存储。
pub struct BrokenReadLogStore;

#[async_trait]
impl ReadLogStore for BrokenReadLogStore {
    async fn append_read_log(&self, _reading: &Reading) -> Result<(), StorageError> {
        Err(StorageError::new("disk full"))
    }

    async fn purge_logs_older_than(&self, _days: u32, _now_ms: i64) -> Result<u64, StorageError> {
        Ok(0)
    }

    async fn list_recent_read_logs(
        &self,
        _limit: u32,
    ) -> Result<Vec<ReadLogRecord>, StorageError> {
        Ok(Vec::new())
    }
}

pub async fn seeded_stores(devices: &[Device]) -> StoreSet {
    let stores = StoreSet::in_memory();
    for device in devices {
        stores.devices.upsert_device(device).await.unwrap();
    }
    stores
}

pub fn fast_config() -> CollectionConfig {
    CollectionConfig {
        interval_seconds: 1,
        ..CollectionConfig::default()
    }
}

pub async fn service_with(
    client: Arc<FakeClient>,
    stores: StoreSet,
    config: CollectionConfig,
) -> Arc<CollectionService> {
    let service = Arc::new(CollectionService::new(client, stores, config));
    service.initialize().await.unwrap();
    service
}

/// 等待下一个周期完成事件，跳过连接事件。
pub async fn next_cycle(rx: &mut broadcast::Receiver<CollectionEvent>) -> CycleReport {
    loop {
        match rx.recv().await.expect("event channel open") {
            CollectionEvent::CycleCompleted(report) => return report,
            CollectionEvent::ConnectionChanged(_) => continue,
        }
    }
}

/// 取出当前已发布的全部事件。
pub fn drain(rx: &mut broadcast::Receiver<CollectionEvent>) -> Vec<CollectionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

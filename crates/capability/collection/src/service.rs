//! 采集服务
//!
//! 运行状态只有 Stopped / Running 两种：
//! - `start()`：置为 Running 并立即唤醒后台循环执行一次周期
//! - `stop()`：置为 Running=false，进行中的周期照常完成
//!
//! 后台循环是单个任务，在 "间隔到期 / 立即触发 / 停机" 三者中择先，
//! 周期结束后才进入下一次等待，因此周期不会重叠。

use crate::error::CollectionError;
use crate::events::{CollectionEvent, ConnectionChange, CycleReport, EventSink};
use crate::registry::DeviceRegistry;
use crate::status::{CollectionStatus, device_statuses};
use domain::{CollectionRunState, DeviceStatus, LatestValue, Reading, now_epoch_ms};
use plc_protocol::RegisterClient;
use plc_storage::{
    LatestValueStore, ReadLogStore, SETTING_LOG_RETENTION_DAYS, SETTING_PLC_HOST,
    SETTING_PLC_PORT, SETTING_READ_INTERVAL, StorageError, StoreSet,
};
use plc_telemetry::{
    new_cycle_id, record_connect_attempt, record_cycle_finished, record_cycle_skipped,
    record_cycle_started, record_latest_value_write_failure, record_read,
    record_read_log_write_failure,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::{Notify, broadcast, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// 采集服务配置。
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub interval_seconds: u64,
    /// 周期异常后的冷却时间
    pub error_cooldown: Duration,
    /// 最新值写入失败后的重试次数
    pub persist_retries: u32,
    pub persist_backoff_ms: u64,
    /// `system_config` 未配置时的日志保留天数
    pub log_retention_days: u32,
    pub fresh_window_ms: i64,
    pub event_capacity: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 5,
            error_cooldown: Duration::from_secs(10),
            persist_retries: 1,
            persist_backoff_ms: 0,
            log_retention_days: 30,
            fresh_window_ms: 600_000,
            event_capacity: 64,
        }
    }
}

/// PLC 采集服务。
pub struct CollectionService {
    client: Arc<dyn RegisterClient>,
    stores: StoreSet,
    registry: DeviceRegistry,
    config: CollectionConfig,
    run_state: Mutex<CollectionRunState>,
    /// 周期互斥：持有期间其他周期请求被跳过
    cycle_lock: tokio::sync::Mutex<()>,
    trigger: Notify,
    events: EventSink,
    /// 最近一次发布的连接状态
    published_connection: Mutex<Option<bool>>,
    last_report: RwLock<Option<CycleReport>>,
}

impl CollectionService {
    pub fn new(
        client: Arc<dyn RegisterClient>,
        stores: StoreSet,
        config: CollectionConfig,
    ) -> Self {
        let run_state = CollectionRunState {
            running: false,
            interval_seconds: config.interval_seconds.max(1),
        };
        Self {
            registry: DeviceRegistry::new(stores.devices.clone()),
            events: EventSink::new(config.event_capacity),
            client,
            stores,
            config,
            run_state: Mutex::new(run_state),
            cycle_lock: tokio::sync::Mutex::new(()),
            trigger: Notify::new(),
            published_connection: Mutex::new(None),
            last_report: RwLock::new(None),
        }
    }

    /// 加载存储中的配置并加载设备注册表，返回设备数量。
    pub async fn initialize(&self) -> Result<usize, CollectionError> {
        self.load_settings().await?;
        let count = self.registry.reload().await?;
        let run_state = self.run_state();
        info!(
            target: "plc.collection",
            devices = count,
            interval_seconds = run_state.interval_seconds,
            endpoint = %self.client.connection_state().endpoint(),
            "collection_initialized"
        );
        Ok(count)
    }

    pub fn client(&self) -> &Arc<dyn RegisterClient> {
        &self.client
    }

    pub fn stores(&self) -> &StoreSet {
        &self.stores
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent> {
        self.events.subscribe()
    }

    fn lock_run_state(&self) -> MutexGuard<'_, CollectionRunState> {
        match self.run_state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn run_state(&self) -> CollectionRunState {
        *self.lock_run_state()
    }

    pub fn is_running(&self) -> bool {
        self.lock_run_state().running
    }

    /// 下一次等待时长（修改间隔只影响之后的等待）。
    pub fn next_wait(&self) -> Duration {
        Duration::from_secs(self.lock_run_state().interval_seconds)
    }

    /// 周期异常后的等待时长，总是长于正常间隔。
    pub fn cooldown_wait(&self) -> Duration {
        let interval = self.next_wait();
        if self.config.error_cooldown > interval {
            self.config.error_cooldown
        } else {
            interval + self.config.error_cooldown
        }
    }

    /// 开始采集，并立即执行一次周期。
    pub fn start(&self) {
        self.lock_run_state().running = true;
        self.trigger.notify_one();
        info!(target: "plc.collection", "collection_started");
    }

    /// 停止采集；进行中的周期照常完成。
    pub fn stop(&self) {
        self.lock_run_state().running = false;
        info!(target: "plc.collection", "collection_stopped");
    }

    pub fn last_report(&self) -> Option<CycleReport> {
        match self.last_report.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn status(&self) -> CollectionStatus {
        CollectionStatus {
            run_state: self.run_state(),
            connection: self.client.connection_state(),
            device_count: self.registry.len(),
            last_report: self.last_report(),
        }
    }

    /// 全部设备的状态视图。
    pub async fn device_statuses(&self) -> Result<Vec<DeviceStatus>, CollectionError> {
        device_statuses(&self.stores, now_epoch_ms(), self.config.fresh_window_ms).await
    }

    /// 重新加载设备注册表。
    pub async fn reload_devices(&self) -> Result<usize, CollectionError> {
        self.registry.reload().await
    }

    /// 更新 PLC 端点：下次连接生效，不断开现有连接。
    pub async fn update_endpoint(&self, host: &str, port: u16) -> Result<(), CollectionError> {
        let host = host.trim();
        if host.is_empty() || port == 0 {
            warn!(target: "plc.collection", host, port, "endpoint_update_rejected");
            return Err(CollectionError::Config(format!(
                "invalid endpoint {host}:{port}"
            )));
        }
        self.stores.settings.set_setting(SETTING_PLC_HOST, host).await?;
        self.stores
            .settings
            .set_setting(SETTING_PLC_PORT, &port.to_string())
            .await?;
        self.client.configure(host, port, None);
        info!(target: "plc.collection", host, port, "endpoint_updated");
        Ok(())
    }

    /// 更新轮询间隔；非正数被拒绝且不做任何修改。
    pub async fn update_interval(&self, seconds: i64) -> Result<(), CollectionError> {
        if seconds <= 0 {
            warn!(target: "plc.collection", seconds, "interval_update_rejected");
            return Err(CollectionError::Config(format!(
                "interval must be positive, got {seconds}"
            )));
        }
        self.stores
            .settings
            .set_setting(SETTING_READ_INTERVAL, &seconds.to_string())
            .await?;
        self.lock_run_state().interval_seconds = seconds as u64;
        info!(target: "plc.collection", seconds, "interval_updated");
        Ok(())
    }

    /// 用存储中的配置覆盖启动默认值；无法解析的值被忽略。
    pub async fn load_settings(&self) -> Result<(), CollectionError> {
        let settings = &self.stores.settings;
        let current = self.client.connection_state();
        let host = settings.get_setting(SETTING_PLC_HOST).await?;
        let port = match settings.get_setting(SETTING_PLC_PORT).await? {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => Some(port),
                _ => {
                    warn!(
                        target: "plc.collection",
                        key = SETTING_PLC_PORT,
                        value = %raw,
                        "setting_ignored"
                    );
                    None
                }
            },
            None => None,
        };
        let host = host.filter(|value| !value.trim().is_empty());
        if host.is_some() || port.is_some() {
            let host = host.unwrap_or_else(|| current.host.clone());
            self.client
                .configure(host.trim(), port.unwrap_or(current.port), None);
        }

        if let Some(raw) = settings.get_setting(SETTING_READ_INTERVAL).await? {
            match raw.trim().parse::<u64>() {
                Ok(seconds) if seconds > 0 => {
                    self.lock_run_state().interval_seconds = seconds;
                }
                _ => {
                    warn!(
                        target: "plc.collection",
                        key = SETTING_READ_INTERVAL,
                        value = %raw,
                        "setting_ignored"
                    );
                }
            }
        }
        Ok(())
    }

    /// 按保留天数清理读取日志，返回删除行数。
    pub async fn purge_old_logs(&self) -> Result<u64, CollectionError> {
        let days = match self
            .stores
            .settings
            .get_setting(SETTING_LOG_RETENTION_DAYS)
            .await?
        {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(days) if days > 0 => days,
                _ => {
                    warn!(
                        target: "plc.collection",
                        key = SETTING_LOG_RETENTION_DAYS,
                        value = %raw,
                        "setting_ignored"
                    );
                    self.config.log_retention_days
                }
            },
            None => self.config.log_retention_days,
        };
        let purged = self
            .stores
            .read_logs
            .purge_logs_older_than(days, now_epoch_ms())
            .await?;
        info!(target: "plc.collection", retention_days = days, purged, "read_logs_purged");
        Ok(purged)
    }

    /// 立即执行一次周期；已有周期在执行时返回 `None`。
    pub async fn trigger_cycle(&self) -> Option<CycleReport> {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            record_cycle_skipped();
            debug!(target: "plc.collection", "cycle_skipped_in_flight");
            return None;
        };
        Some(self.run_cycle().await)
    }

    /// 启动后台循环，`shutdown` 置为 true 或发送端关闭时退出。
    pub fn spawn(self: &Arc<Self>, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(service.run(shutdown))
    }

    async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(target: "plc.collection", "collection_loop_started");
        let mut cooldown = false;
        loop {
            if *shutdown.borrow() {
                break;
            }
            let wait = if cooldown {
                self.cooldown_wait()
            } else {
                self.next_wait()
            };
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = self.trigger.notified() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }
            cooldown = false;
            if !self.is_running() {
                continue;
            }

            // 周期放在循环持有的 JoinSet 中执行：panic 只结束该任务，
            // 循环任务被中止时 JoinSet 随之释放并中止周期
            let service = Arc::clone(&self);
            let mut cycle = JoinSet::new();
            cycle.spawn(async move { service.trigger_cycle().await });
            match cycle.join_next().await {
                Some(Ok(_)) | None => {}
                Some(Err(err)) if err.is_panic() => {
                    error!(
                        target: "plc.collection",
                        error = %err,
                        cooldown_seconds = self.cooldown_wait().as_secs(),
                        "cycle_panicked"
                    );
                    cooldown = true;
                }
                Some(Err(err)) => {
                    warn!(target: "plc.collection", error = %err, "cycle_task_cancelled");
                    break;
                }
            }
        }
        info!(target: "plc.collection", "collection_loop_stopped");
    }

    async fn run_cycle(&self) -> CycleReport {
        let cycle_id = new_cycle_id();
        let started_at_ms = now_epoch_ms();
        let started = Instant::now();
        record_cycle_started();
        debug!(target: "plc.collection", cycle_id = %cycle_id, "cycle_started");

        let mut values = BTreeMap::new();
        let mut errors = Vec::new();

        if !self.client.is_connected() {
            let connected = self.client.connect().await;
            record_connect_attempt(connected);
            if !connected {
                let state = self.client.connection_state();
                warn!(
                    target: "plc.collection",
                    cycle_id = %cycle_id,
                    endpoint = %state.endpoint(),
                    status = %state.status_message,
                    "cycle_no_connection"
                );
                errors.push(format!("plc not connected: {}", state.status_message));
                self.publish_connection(false, state.status_message);
                return self.finish(cycle_id, started_at_ms, started, values, errors, false);
            }
        }
        if self.last_published_connection() != Some(true) {
            let state = self.client.connection_state();
            self.publish_connection(true, state.status_message);
        }

        let devices = self.registry.snapshot();
        let mut readings = Vec::with_capacity(devices.len());
        let mut reconnect_failed = false;
        for device in devices.iter() {
            // 传输错误或超时会丢弃会话：下一个设备前重连，单个设备的故障不影响其余设备
            if !reconnect_failed && !self.client.is_connected() {
                reconnect_failed = !self.reconnect(&cycle_id).await;
            }
            match self.client.read_register(device.address).await {
                Ok(raw) => {
                    record_read(true);
                    let value = device.data_type.decode(raw);
                    values.insert(device.name.clone(), value);
                    readings.push(Reading::success(device, value, now_epoch_ms()));
                }
                Err(err) => {
                    record_read(false);
                    errors.push(format!(
                        "{} ({}): {err}",
                        device.name,
                        device.display_address()
                    ));
                    readings.push(Reading::failure(device, err.to_string(), now_epoch_ms()));
                }
            }
        }

        if values.is_empty() {
            warn!(
                target: "plc.collection",
                cycle_id = %cycle_id,
                devices = devices.len(),
                "cycle_no_device_data"
            );
            errors.push("no device data read".to_string());
        } else {
            errors.extend(self.persist(readings).await);
        }

        let connected = self.client.is_connected();
        if !connected && self.last_published_connection() != Some(false) {
            let state = self.client.connection_state();
            self.publish_connection(false, state.status_message);
        }
        self.finish(cycle_id, started_at_ms, started, values, errors, connected)
    }

    /// 周期内会话断开后重连一次，成功返回 true。
    async fn reconnect(&self, cycle_id: &str) -> bool {
        let lost = self.client.connection_state();
        if self.last_published_connection() != Some(false) {
            self.publish_connection(false, lost.status_message.clone());
        }
        let connected = self.client.connect().await;
        record_connect_attempt(connected);
        let state = self.client.connection_state();
        if connected {
            info!(
                target: "plc.collection",
                cycle_id,
                endpoint = %state.endpoint(),
                "cycle_reconnected"
            );
            self.publish_connection(true, state.status_message);
        } else {
            warn!(
                target: "plc.collection",
                cycle_id,
                endpoint = %state.endpoint(),
                status = %state.status_message,
                "cycle_reconnect_failed"
            );
        }
        connected
    }

    /// 按设备并发写入最新值与读取日志，返回设备级错误。
    async fn persist(&self, readings: Vec<Reading>) -> Vec<String> {
        let mut tasks = JoinSet::new();
        for reading in readings {
            let latest_values = Arc::clone(&self.stores.latest_values);
            let read_logs = Arc::clone(&self.stores.read_logs);
            let retries = self.config.persist_retries;
            let backoff_ms = self.config.persist_backoff_ms;
            tasks.spawn(async move {
                persist_reading(latest_values, read_logs, reading, retries, backoff_ms).await
            });
        }

        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(err)) => errors.push(err),
                Ok(None) => {}
                Err(err) => {
                    error!(target: "plc.collection", error = %err, "persist_task_failed");
                    errors.push(format!("persist task failed: {err}"));
                }
            }
        }
        errors
    }

    fn finish(
        &self,
        cycle_id: String,
        started_at_ms: i64,
        started: Instant,
        values: BTreeMap<String, f64>,
        errors: Vec<String>,
        connected: bool,
    ) -> CycleReport {
        let success = errors.is_empty() && !values.is_empty();
        let report = CycleReport {
            cycle_id,
            started_at_ms,
            finished_at_ms: now_epoch_ms(),
            values,
            errors,
            success,
            connected,
        };
        let latency_ms = started.elapsed().as_millis() as u64;
        record_cycle_finished(success, latency_ms);
        info!(
            target: "plc.collection",
            cycle_id = %report.cycle_id,
            success,
            connected,
            values = report.values.len(),
            errors = report.errors.len(),
            latency_ms,
            "cycle_completed"
        );
        match self.last_report.write() {
            Ok(mut guard) => *guard = Some(report.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(report.clone()),
        }
        self.events
            .publish(CollectionEvent::CycleCompleted(report.clone()));
        report
    }

    fn last_published_connection(&self) -> Option<bool> {
        match self.published_connection.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn publish_connection(&self, connected: bool, status_message: String) {
        match self.published_connection.lock() {
            Ok(mut guard) => *guard = Some(connected),
            Err(poisoned) => *poisoned.into_inner() = Some(connected),
        }
        info!(
            target: "plc.collection",
            connected,
            status = %status_message,
            "connection_changed"
        );
        self.events
            .publish(CollectionEvent::ConnectionChanged(ConnectionChange {
                connected,
                status_message,
                ts_ms: now_epoch_ms(),
            }));
    }
}

/// 写入单个设备的读取结果；读取日志失败只记录，最新值失败返回设备错误。
async fn persist_reading(
    latest_values: Arc<dyn LatestValueStore>,
    read_logs: Arc<dyn ReadLogStore>,
    reading: Reading,
    max_retries: u32,
    backoff_ms: u64,
) -> Option<String> {
    let latest_write = async {
        let value = reading.value.filter(|_| reading.is_success())?;
        let latest = LatestValue {
            device_name: reading.device_name.clone(),
            address: reading.address,
            value,
            updated_at_ms: reading.ts_ms,
        };
        upsert_with_retry(latest_values.as_ref(), &latest, max_retries, backoff_ms)
            .await
            .err()
    };
    let log_write = async {
        if let Err(err) = read_logs.append_read_log(&reading).await {
            record_read_log_write_failure();
            warn!(
                target: "plc.collection",
                device = %reading.device_name,
                error = %err,
                "read_log_write_failed"
            );
        }
    };
    let (latest_err, ()) = tokio::join!(latest_write, log_write);

    latest_err.map(|err| {
        record_latest_value_write_failure();
        error!(
            target: "plc.collection",
            device = %reading.device_name,
            error = %err,
            "latest_value_write_failed"
        );
        format!("{}: persist latest value failed: {err}", reading.device_name)
    })
}

async fn upsert_with_retry(
    store: &dyn LatestValueStore,
    value: &LatestValue,
    max_retries: u32,
    backoff_ms: u64,
) -> Result<(), StorageError> {
    let mut attempt = 0u32;
    loop {
        match store.upsert_latest_value(value).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                attempt += 1;
                if attempt > max_retries {
                    return Err(err);
                }
                if backoff_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }
}

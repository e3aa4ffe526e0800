//! 追踪、请求 ID 与采集计数指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 采集指标快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cycles_started: u64,
    pub cycles_succeeded: u64,
    pub cycles_failed: u64,
    pub cycles_skipped: u64,
    pub reads_ok: u64,
    pub reads_failed: u64,
    pub connect_attempts: u64,
    pub connect_failures: u64,
    pub latest_value_write_failures: u64,
    pub read_log_write_failures: u64,
    pub cycle_latency_ms_total: u64,
    pub cycle_latency_ms_count: u64,
}

/// 进程级采集指标。
#[derive(Default)]
pub struct TelemetryMetrics {
    cycles_started: AtomicU64,
    cycles_succeeded: AtomicU64,
    cycles_failed: AtomicU64,
    cycles_skipped: AtomicU64,
    reads_ok: AtomicU64,
    reads_failed: AtomicU64,
    connect_attempts: AtomicU64,
    connect_failures: AtomicU64,
    latest_value_write_failures: AtomicU64,
    read_log_write_failures: AtomicU64,
    cycle_latency_ms_total: AtomicU64,
    cycle_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_started: self.cycles_started.load(Ordering::Relaxed),
            cycles_succeeded: self.cycles_succeeded.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            cycles_skipped: self.cycles_skipped.load(Ordering::Relaxed),
            reads_ok: self.reads_ok.load(Ordering::Relaxed),
            reads_failed: self.reads_failed.load(Ordering::Relaxed),
            connect_attempts: self.connect_attempts.load(Ordering::Relaxed),
            connect_failures: self.connect_failures.load(Ordering::Relaxed),
            latest_value_write_failures: self.latest_value_write_failures.load(Ordering::Relaxed),
            read_log_write_failures: self.read_log_write_failures.load(Ordering::Relaxed),
            cycle_latency_ms_total: self.cycle_latency_ms_total.load(Ordering::Relaxed),
            cycle_latency_ms_count: self.cycle_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info，可由 RUST_LOG 覆盖）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 生成采集周期 ID。
pub fn new_cycle_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 记录周期开始次数。
pub fn record_cycle_started() {
    metrics().cycles_started.fetch_add(1, Ordering::Relaxed);
}

/// 记录周期结束（成功或失败）及耗时（毫秒）。
pub fn record_cycle_finished(success: bool, latency_ms: u64) {
    let metrics = metrics();
    if success {
        metrics.cycles_succeeded.fetch_add(1, Ordering::Relaxed);
    } else {
        metrics.cycles_failed.fetch_add(1, Ordering::Relaxed);
    }
    metrics
        .cycle_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .cycle_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录因已有周期在执行而被跳过的请求。
pub fn record_cycle_skipped() {
    metrics().cycles_skipped.fetch_add(1, Ordering::Relaxed);
}

/// 记录单寄存器读取结果。
pub fn record_read(ok: bool) {
    if ok {
        metrics().reads_ok.fetch_add(1, Ordering::Relaxed);
    } else {
        metrics().reads_failed.fetch_add(1, Ordering::Relaxed);
    }
}

/// 记录连接尝试。
pub fn record_connect_attempt(ok: bool) {
    let metrics = metrics();
    metrics.connect_attempts.fetch_add(1, Ordering::Relaxed);
    if !ok {
        metrics.connect_failures.fetch_add(1, Ordering::Relaxed);
    }
}

/// 记录最新值写入失败（已用尽重试）。
pub fn record_latest_value_write_failure() {
    metrics()
        .latest_value_write_failures
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录读取日志写入失败。
pub fn record_read_log_write_failure() {
    metrics()
        .read_log_write_failures
        .fetch_add(1, Ordering::Relaxed);
}

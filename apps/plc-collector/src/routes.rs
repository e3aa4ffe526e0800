//! 路由定义
//!
//! - 健康检查：/health
//! - 采集控制：/api/collection/*
//! - 配置更新：/api/config/*
//! - 设备状态：/api/devices/*
//! - 读取日志：/api/read-logs
//! - 寄存器读写：/api/registers/{address}
//! - 指标快照：/api/metrics

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/collection/status", get(get_collection_status))
        .route("/api/collection/start", post(start_collection))
        .route("/api/collection/stop", post(stop_collection))
        .route("/api/collection/trigger", post(trigger_cycle))
        .route("/api/config/endpoint", put(update_endpoint))
        .route("/api/config/interval", put(update_interval))
        .route("/api/devices/status", get(list_device_statuses))
        .route("/api/devices/reload", post(reload_devices))
        .route("/api/devices/:name/enabled", put(set_device_enabled))
        .route("/api/read-logs", get(list_read_logs))
        .route(
            "/api/registers/:address",
            get(read_register).put(write_register),
        )
        .route("/api/metrics", get(get_metrics))
}

//! 采集控制 handlers
//!
//! - GET /api/collection/status - 运行状态、连接状态、最近一次周期
//! - POST /api/collection/start - 开始采集并立即执行一次周期
//! - POST /api/collection/stop - 停止采集（进行中的周期照常完成）
//! - POST /api/collection/trigger - 立即执行一次周期；已有周期在执行时不执行

use crate::AppState;
use crate::utils::response::{cycle_report_to_dto, ok, status_to_dto};
use api_contract::TriggerResultDto;
use axum::{extract::State, response::Response};
use tracing::info;

pub async fn get_collection_status(State(state): State<AppState>) -> Response {
    ok(status_to_dto(state.collection.status()))
}

pub async fn start_collection(State(state): State<AppState>) -> Response {
    state.collection.start();
    info!(target: "plc.api", "collection_start_requested");
    ok(status_to_dto(state.collection.status()))
}

pub async fn stop_collection(State(state): State<AppState>) -> Response {
    state.collection.stop();
    info!(target: "plc.api", "collection_stop_requested");
    ok(status_to_dto(state.collection.status()))
}

/// 手动触发不受运行状态影响，但与后台周期互斥。
pub async fn trigger_cycle(State(state): State<AppState>) -> Response {
    let report = state.collection.trigger_cycle().await;
    ok(TriggerResultDto {
        executed: report.is_some(),
        report: report.map(cycle_report_to_dto),
    })
}

//! HTTP 响应辅助函数和 DTO 转换
//!
//! - 错误响应：bad_request_error, not_found_error, plc_error, collection_error, storage_error
//! - DTO 转换：status_to_dto, cycle_report_to_dto, device_status_to_dto, read_log_to_dto

use api_contract::{
    ApiResponse, CollectionStatusDto, ConnectionDto, CycleReportDto, DeviceStatusDto,
    MetricsSnapshotDto, ReadLogDto,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::{ConnectionState, DeviceStatus};
use plc_collection::{CollectionError, CollectionStatus, CycleReport};
use plc_storage::{ReadLogRecord, StorageError};
use plc_telemetry::MetricsSnapshot;

/// 成功响应
pub fn ok<T: serde::Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

pub fn bad_request_error(code: &str, message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(code, message.into())),
    )
        .into_response()
}

pub fn not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "not found")),
    )
        .into_response()
}

/// PLC 通信失败（未连接或读写失败）
pub fn plc_error(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::error(code, message.into()))).into_response()
}

pub fn storage_error(err: StorageError) -> Response {
    let message = err.to_string();
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// 采集服务错误：配置错误返回 400，其余返回 500
pub fn collection_error(err: CollectionError) -> Response {
    match err {
        CollectionError::Config(message) => bad_request_error("CONFIG.INVALID", message),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error("INTERNAL.ERROR", other.to_string())),
        )
            .into_response(),
    }
}

pub fn connection_to_dto(state: ConnectionState) -> ConnectionDto {
    ConnectionDto {
        connected: state.connected,
        host: state.host,
        port: state.port,
        status_message: state.status_message,
    }
}

pub fn cycle_report_to_dto(report: CycleReport) -> CycleReportDto {
    CycleReportDto {
        cycle_id: report.cycle_id,
        started_at_ms: report.started_at_ms,
        finished_at_ms: report.finished_at_ms,
        values: report.values,
        errors: report.errors,
        success: report.success,
        connected: report.connected,
    }
}

pub fn status_to_dto(status: CollectionStatus) -> CollectionStatusDto {
    CollectionStatusDto {
        running: status.run_state.running,
        interval_seconds: status.run_state.interval_seconds,
        device_count: status.device_count,
        connection: connection_to_dto(status.connection),
        last_cycle: status.last_report.map(cycle_report_to_dto),
    }
}

pub fn device_status_to_dto(status: DeviceStatus) -> DeviceStatusDto {
    DeviceStatusDto {
        address: format!("D{}", status.address),
        name: status.name,
        description: status.description,
        value: status.value,
        updated_at_ms: status.updated_at_ms,
        enabled: status.enabled,
        liveness: status.liveness.as_str().to_string(),
    }
}

pub fn read_log_to_dto(record: ReadLogRecord) -> ReadLogDto {
    let reading = record.reading;
    ReadLogDto {
        id: record.id,
        address: format!("D{}", reading.address),
        device_name: reading.device_name,
        value: reading.value,
        read_time_ms: reading.ts_ms,
        status: reading.outcome.as_str().to_string(),
        error: reading.error,
    }
}

pub fn metrics_to_dto(snapshot: MetricsSnapshot) -> MetricsSnapshotDto {
    MetricsSnapshotDto {
        cycles_started: snapshot.cycles_started,
        cycles_succeeded: snapshot.cycles_succeeded,
        cycles_failed: snapshot.cycles_failed,
        cycles_skipped: snapshot.cycles_skipped,
        reads_ok: snapshot.reads_ok,
        reads_failed: snapshot.reads_failed,
        connect_attempts: snapshot.connect_attempts,
        connect_failures: snapshot.connect_failures,
        latest_value_write_failures: snapshot.latest_value_write_failures,
        read_log_write_failures: snapshot.read_log_write_failures,
        cycle_latency_ms_total: snapshot.cycle_latency_ms_total,
        cycle_latency_ms_count: snapshot.cycle_latency_ms_count,
    }
}

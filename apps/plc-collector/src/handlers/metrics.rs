//! 采集指标快照
//!
//! - GET /api/metrics

use crate::utils::response::{metrics_to_dto, ok};
use axum::response::Response;
use plc_telemetry::metrics;

pub async fn get_metrics() -> Response {
    ok(metrics_to_dto(metrics().snapshot()))
}

//! 配置更新 handlers
//!
//! - PUT /api/config/endpoint - 更新 PLC 端点（下次连接生效）
//! - PUT /api/config/interval - 更新轮询间隔（非正数返回 400）

use crate::AppState;
use crate::utils::response::{collection_error, ok, status_to_dto};
use crate::utils::validation::normalize_required;
use api_contract::{UpdateEndpointRequest, UpdateIntervalRequest};
use axum::{Json, extract::State, response::Response};

pub async fn update_endpoint(
    State(state): State<AppState>,
    Json(req): Json<UpdateEndpointRequest>,
) -> Response {
    let host = match normalize_required(&req.host, "host") {
        Ok(host) => host,
        Err(response) => return response,
    };
    match state.collection.update_endpoint(&host, req.port).await {
        Ok(()) => ok(status_to_dto(state.collection.status())),
        Err(err) => collection_error(err),
    }
}

pub async fn update_interval(
    State(state): State<AppState>,
    Json(req): Json<UpdateIntervalRequest>,
) -> Response {
    match state.collection.update_interval(req.interval_seconds).await {
        Ok(()) => ok(status_to_dto(state.collection.status())),
        Err(err) => collection_error(err),
    }
}

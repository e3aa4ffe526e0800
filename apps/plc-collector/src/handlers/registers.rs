//! 单寄存器读写（调试用）
//!
//! - GET /api/registers/{address} - 读取单个保持寄存器
//! - PUT /api/registers/{address} - 写入单个保持寄存器
//!
//! 未连接时先尝试连接一次；与采集周期共用同一个协议会话。

use crate::AppState;
use crate::utils::response::{ok, plc_error};
use crate::utils::validation::parse_address_param;
use api_contract::{RegisterValueDto, WriteRegisterRequest};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use plc_protocol::RegisterClient;
use tracing::{info, warn};

async fn ensure_connected(client: &dyn RegisterClient) -> Result<(), Response> {
    if client.is_connected() || client.connect().await {
        return Ok(());
    }
    let state = client.connection_state();
    Err(plc_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "PLC.NOT_CONNECTED",
        state.status_message,
    ))
}

pub async fn read_register(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Response {
    let address = match parse_address_param(&address) {
        Ok(address) => address,
        Err(response) => return response,
    };
    let client = state.collection.client().as_ref();
    if let Err(response) = ensure_connected(client).await {
        return response;
    }
    match client.read_register(address).await {
        Ok(value) => ok(RegisterValueDto {
            address: format!("D{address}"),
            value,
        }),
        Err(err) => {
            warn!(target: "plc.api", address, error = %err, "register_read_failed");
            plc_error(StatusCode::BAD_GATEWAY, "PLC.READ_FAILED", err.to_string())
        }
    }
}

pub async fn write_register(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Json(req): Json<WriteRegisterRequest>,
) -> Response {
    let address = match parse_address_param(&address) {
        Ok(address) => address,
        Err(response) => return response,
    };
    let client = state.collection.client().as_ref();
    if let Err(response) = ensure_connected(client).await {
        return response;
    }
    if client.write_register(address, req.value).await {
        info!(target: "plc.api", address, value = req.value, "register_written");
        ok(RegisterValueDto {
            address: format!("D{address}"),
            value: req.value,
        })
    } else {
        plc_error(
            StatusCode::BAD_GATEWAY,
            "PLC.WRITE_FAILED",
            format!("write D{address} failed"),
        )
    }
}

//! 读取日志查询
//!
//! - GET /api/read-logs?limit=N - 最近的读取日志（默认 100 条，按时间倒序）

use crate::AppState;
use crate::utils::response::{ok, read_log_to_dto, storage_error};
use crate::utils::validation::normalize_limit;
use api_contract::{ReadLogDto, ReadLogQuery};
use axum::{
    extract::{Query, State},
    response::Response,
};

pub async fn list_read_logs(
    State(state): State<AppState>,
    Query(query): Query<ReadLogQuery>,
) -> Response {
    let limit = normalize_limit(query.limit);
    match state
        .collection
        .stores()
        .read_logs
        .list_recent_read_logs(limit)
        .await
    {
        Ok(records) => ok(records
            .into_iter()
            .map(read_log_to_dto)
            .collect::<Vec<ReadLogDto>>()),
        Err(err) => storage_error(err),
    }
}

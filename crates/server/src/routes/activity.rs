//! Routes for the activity log.

use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::activity_log::{ActivityLog, ActivityModule};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Deserialize, TS)]
pub struct ActivityQuery {
    pub module: Option<ActivityModule>,
    pub limit: Option<i64>,
}

pub async fn list_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ActivityLog>>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 1000);
    let logs = match query.module {
        Some(module) => ActivityLog::find_by_module(&state.db.pool, module, limit).await?,
        None => ActivityLog::find_recent(&state.db.pool, limit).await?,
    };
    Ok(ResponseJson(ApiResponse::success(logs)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/activity-logs", get(list_activity))
}

//! Dashboard route: one query returns the full KPI snapshot for a filter.

use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use serde::Deserialize;
use services::services::dashboard::{DashboardData, DashboardFilter};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// Filter query; any combination of fields may be omitted. Without a year
/// the most recent year with recorded statistics is used.
#[derive(Debug, Deserialize, TS)]
pub struct DashboardQuery {
    pub year: Option<i32>,
    pub school_id: Option<i64>,
    pub level: Option<String>,
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<ResponseJson<ApiResponse<DashboardData>>, ApiError> {
    let level = query.level.filter(|l| !l.trim().is_empty());
    let filter = match query.year {
        Some(year) => DashboardFilter {
            year,
            school_id: query.school_id,
            level,
        },
        None => {
            let default = state.dashboard.default_filter().await?;
            DashboardFilter {
                year: default.year,
                school_id: query.school_id,
                level,
            }
        }
    };

    let data = state.dashboard.load(&filter).await?;
    Ok(ResponseJson(ApiResponse::success(data)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

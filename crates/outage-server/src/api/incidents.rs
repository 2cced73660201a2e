use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use outage_core::AreaCode;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, query_rejection, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct IncidentsQuery {
    #[serde(alias = "zip")]
    pub area_code: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct IncidentItem {
    id: i64,
    area_code: String,
    outage_start_time: DateTime<Utc>,
    outage_end_time: DateTime<Utc>,
    affected_customers: i32,
    incident_summary: String,
    status: String,
    created_at: DateTime<Utc>,
}

/// GET /api/v1/incidents: confirmed incidents, newest first.
pub(super) async fn list_incidents(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<IncidentsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<IncidentItem>>>, ApiError> {
    let Query(query) = query.map_err(|e| query_rejection(&req_id.0, &e))?;
    let area_code = query
        .area_code
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(AreaCode::parse)
        .transpose()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let rows = outage_db::list_confirmed_incidents(
        &state.pool,
        area_code.as_ref().map(AreaCode::as_str),
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| IncidentItem {
            id: row.id,
            area_code: row.area_code,
            outage_start_time: row.outage_start_time,
            outage_end_time: row.outage_end_time,
            affected_customers: row.affected_customers,
            incident_summary: row.incident_summary,
            status: row.status,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use outage_core::DEFAULT_WINDOW_HOURS;
use outage_summary::{IncidentSummary, SummaryVariant};
use serde::Deserialize;

use crate::inflight::generation_key;
use crate::middleware::RequestId;

use super::{
    json_rejection, map_pipeline_error, require_area_code, resolve_window, ApiError, ApiResponse,
    AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct SummaryRequest {
    #[serde(alias = "zip")]
    pub area_code: Option<String>,
    pub hours: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// POST /api/v1/outages/summary: analyst-facing overview of one area.
pub(super) async fn generate_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<IncidentSummary>>, ApiError> {
    let Json(body) = body.map_err(|e| json_rejection(&req_id.0, &e))?;
    let rid = &req_id.0;
    let area_code = require_area_code(rid, body.area_code.as_deref())?;
    let window = resolve_window(
        rid,
        body.hours,
        body.start_date.as_deref(),
        body.end_date.as_deref(),
        DEFAULT_WINDOW_HOURS,
    )?;

    let _guard = state
        .inflight
        .try_acquire(generation_key("summary", area_code.as_str(), &window.key()))
        .ok_or_else(|| {
            ApiError::new(
                rid,
                "conflict",
                format!("a summary for area {area_code} is already being generated"),
            )
        })?;

    let summary = state
        .pipeline()
        .summarize(&area_code, &window, SummaryVariant::Analyst)
        .await
        .map_err(|e| map_pipeline_error(rid.clone(), e))?;

    Ok(Json(ApiResponse {
        data: summary,
        meta: ResponseMeta::new(req_id.0),
    }))
}

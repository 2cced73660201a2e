//! Network-team alert flow.
//!
//! `action: "generate"` drafts an incident from one area's calls;
//! `action: "submit"` records an operator-confirmed incident. Submissions are
//! never deduplicated.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use outage_core::{parse_date, AreaCode, IncidentSubmission, DEFAULT_WINDOW_HOURS};
use outage_summary::{IncidentSummary, SummaryVariant};
use serde::{Deserialize, Serialize};

use crate::inflight::generation_key;
use crate::middleware::RequestId;

use super::{
    json_rejection, map_db_error, map_pipeline_error, require_area_code, resolve_window, ApiError,
    ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct AlertRequest {
    pub action: Option<String>,
    #[serde(alias = "zip")]
    pub area_code: Option<String>,
    pub hours: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(alias = "incidentData")]
    pub incident: Option<IncidentPayload>,
}

#[derive(Debug, Deserialize)]
pub(super) struct IncidentPayload {
    #[serde(alias = "zip_code")]
    pub area_code: Option<String>,
    pub outage_start_time: Option<String>,
    pub outage_end_time: Option<String>,
    pub affected_customers: Option<i64>,
    pub incident_summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct IncidentDraft {
    pub area_code: AreaCode,
    pub outage_start_time: DateTime<Utc>,
    pub outage_end_time: DateTime<Utc>,
    pub affected_customers: usize,
    pub incident_summary: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub(super) enum AlertData {
    Generate {
        incident: IncidentDraft,
        call_count: usize,
    },
    Submit {
        id: i64,
        area_code: String,
        outage_start_time: DateTime<Utc>,
        outage_end_time: DateTime<Utc>,
        affected_customers: i32,
        incident_summary: String,
        status: String,
        created_at: DateTime<Utc>,
    },
}

impl From<IncidentSummary> for AlertData {
    fn from(summary: IncidentSummary) -> Self {
        Self::Generate {
            call_count: summary.call_count,
            incident: IncidentDraft {
                area_code: summary.area_code,
                outage_start_time: summary.outage_start,
                outage_end_time: summary.outage_end,
                affected_customers: summary.affected_customers,
                incident_summary: summary.summary_text,
            },
        }
    }
}

fn required<'a>(req_id: &str, field: &str, value: Option<&'a str>) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::new(req_id, "validation_error", format!("{field} is required")))
}

fn parse_timestamp(req_id: &str, field: &str, value: Option<&str>) -> Result<DateTime<Utc>, ApiError> {
    parse_date(required(req_id, field, value)?)
        .map_err(|_| ApiError::new(req_id, "validation_error", format!("{field} is not a valid timestamp")))
}

/// Turn a submit payload into a validated record. `fallback_area` is the
/// request's top-level area code, used when the incident omits its own.
pub(super) fn parse_submission(
    req_id: &str,
    payload: &IncidentPayload,
    fallback_area: Option<&str>,
) -> Result<IncidentSubmission, ApiError> {
    let area_code = require_area_code(
        req_id,
        payload
            .area_code
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(fallback_area),
    )?;
    let outage_start = parse_timestamp(req_id, "outage_start_time", payload.outage_start_time.as_deref())?;
    let outage_end = parse_timestamp(req_id, "outage_end_time", payload.outage_end_time.as_deref())?;
    let affected_customers = payload
        .affected_customers
        .ok_or_else(|| ApiError::new(req_id, "validation_error", "affected_customers is required"))
        .and_then(|n| {
            i32::try_from(n).map_err(|_| {
                ApiError::new(req_id, "validation_error", "affected_customers is out of range")
            })
        })?;
    let summary_text = required(req_id, "incident_summary", payload.incident_summary.as_deref())?;

    IncidentSubmission::new(area_code, outage_start, outage_end, affected_customers, summary_text)
        .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string()))
}

/// POST /api/v1/outages/alert
pub(super) async fn handle_alert(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<AlertRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AlertData>>), ApiError> {
    let Json(body) = body.map_err(|e| json_rejection(&req_id.0, &e))?;
    let rid = &req_id.0;
    let action = required(rid, "action", body.action.as_deref())?;

    let (status, data) = match action {
        "generate" => (StatusCode::OK, generate(&state, rid, &body).await?),
        "submit" => (StatusCode::CREATED, submit(&state, rid, &body).await?),
        other => {
            return Err(ApiError::new(
                rid,
                "validation_error",
                format!("action must be 'generate' or 'submit', got '{other}'"),
            ))
        }
    };

    Ok((
        status,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

async fn generate(state: &AppState, rid: &str, body: &AlertRequest) -> Result<AlertData, ApiError> {
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
        .try_acquire(generation_key("alert", area_code.as_str(), &window.key()))
        .ok_or_else(|| {
            ApiError::new(
                rid,
                "conflict",
                format!("an alert for area {area_code} is already being generated"),
            )
        })?;

    let summary = state
        .pipeline()
        .summarize(&area_code, &window, SummaryVariant::Alert)
        .await
        .map_err(|e| map_pipeline_error(rid.to_owned(), e))?;

    Ok(AlertData::from(summary))
}

async fn submit(state: &AppState, rid: &str, body: &AlertRequest) -> Result<AlertData, ApiError> {
    let payload = body.incident.as_ref().ok_or_else(|| {
        ApiError::new(rid, "validation_error", "incident is required for the submit action")
    })?;
    let submission = parse_submission(rid, payload, body.area_code.as_deref())?;

    let row = outage_db::insert_confirmed_incident(&state.pool, &submission)
        .await
        .map_err(|e| map_db_error(rid.to_owned(), &e))?;

    tracing::info!(
        incident_id = row.id,
        area_code = %row.area_code,
        affected_customers = row.affected_customers,
        "confirmed incident recorded"
    );

    Ok(AlertData::Submit {
        id: row.id,
        area_code: row.area_code,
        outage_start_time: row.outage_start_time,
        outage_end_time: row.outage_end_time,
        affected_customers: row.affected_customers,
        incident_summary: row.incident_summary,
        status: row.status,
        created_at: row.created_at,
    })
}

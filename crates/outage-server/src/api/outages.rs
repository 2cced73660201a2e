//! Read-only outage dashboard handlers.
//!
//! - `GET /api/v1/outages`: per-area aggregates with map coordinates
//! - `GET /api/v1/outages/transcripts`: calls behind one area's marker
//! - `GET /api/v1/outages/timeline`: hourly call counts
//! - `GET /api/v1/outages/stats`: stat-card totals

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use outage_core::{lookup_area, AreaCode, TimeWindow, DEFAULT_WINDOW_HOURS};
use outage_db::{AreaAggregateRow, TranscriptRow};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_db_error, query_rejection, require_area_code, resolve_window, ApiError, ApiResponse,
    AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct WindowQuery {
    pub hours: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AreaWindowQuery {
    #[serde(alias = "zip")]
    pub area_code: Option<String>,
    pub hours: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct WindowItem {
    pub since: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
    pub hours: i64,
}

impl From<&TimeWindow> for WindowItem {
    fn from(window: &TimeWindow) -> Self {
        Self {
            since: window.since,
            until: window.until,
            hours: window.hours,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CoordinatesItem {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct OutageAreaItem {
    pub area_code: String,
    pub display_name: &'static str,
    pub call_count: i64,
    pub affected_customers: usize,
    pub avg_duration_minutes: f64,
    pub coordinates: CoordinatesItem,
    pub customer_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct OutagesData {
    pub areas: Vec<OutageAreaItem>,
    pub window: WindowItem,
}

#[derive(Debug, Serialize)]
pub(super) struct TranscriptItem {
    pub call_id: i64,
    pub customer_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_minutes: f64,
    pub call_reason: String,
    pub transcript: String,
    pub location: Option<String>,
    pub service_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct TranscriptsData {
    pub area_code: AreaCode,
    pub display_name: Option<&'static str>,
    pub call_count: usize,
    pub transcripts: Vec<TranscriptItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct TimelineBucketItem {
    pub timestamp: DateTime<Utc>,
    pub hour_label: String,
    pub call_count: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct CallStatsItem {
    pub total_calls: i64,
    pub unique_customers: i64,
    pub avg_duration_minutes: f64,
    pub last_call_time: Option<DateTime<Utc>>,
    pub window: WindowItem,
}

/// Attach map coordinates; areas missing from the reference table are
/// dropped without failing the request.
pub(super) fn enrich_aggregates(rows: Vec<AreaAggregateRow>) -> Vec<OutageAreaItem> {
    rows.into_iter()
        .filter_map(|row| {
            let Some(coord) = lookup_area(&row.area_code) else {
                tracing::debug!(area_code = %row.area_code, "dropping area with no known coordinates");
                return None;
            };
            Some(OutageAreaItem {
                display_name: coord.display_name,
                call_count: row.call_count,
                affected_customers: row.customer_ids.len(),
                avg_duration_minutes: row.avg_duration_minutes,
                coordinates: CoordinatesItem {
                    latitude: coord.latitude,
                    longitude: coord.longitude,
                },
                customer_ids: row.customer_ids,
                area_code: row.area_code,
            })
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn transcript_item(row: TranscriptRow) -> TranscriptItem {
    TranscriptItem {
        duration_minutes: (row.ended_at - row.started_at).num_seconds() as f64 / 60.0,
        call_id: row.call_id,
        customer_id: row.customer_id,
        started_at: row.started_at,
        ended_at: row.ended_at,
        call_reason: row.call_reason,
        transcript: row.transcript,
        location: row.location,
        service_address: row.service_address,
    }
}

pub(super) async fn list_outages(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<WindowQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<OutagesData>>, ApiError> {
    let Query(query) = query.map_err(|e| query_rejection(&req_id.0, &e))?;
    let window = resolve_window(
        &req_id.0,
        query.hours,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        DEFAULT_WINDOW_HOURS,
    )?;

    let rows = outage_db::list_area_aggregates(&state.pool, &window)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let areas = enrich_aggregates(rows);
    tracing::debug!(hours = window.hours, areas = areas.len(), "served outage aggregates");

    Ok(Json(ApiResponse {
        data: OutagesData {
            areas,
            window: WindowItem::from(&window),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_outage_transcripts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<AreaWindowQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TranscriptsData>>, ApiError> {
    let Query(query) = query.map_err(|e| query_rejection(&req_id.0, &e))?;
    let area_code = require_area_code(&req_id.0, query.area_code.as_deref())?;
    let window = resolve_window(
        &req_id.0,
        query.hours,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        DEFAULT_WINDOW_HOURS,
    )?;

    let rows = outage_db::list_area_transcripts(&state.pool, &area_code, &window)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    if rows.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no technical-support calls for area {area_code} in the requested window"),
        ));
    }

    let transcripts: Vec<TranscriptItem> = rows.into_iter().map(transcript_item).collect();
    Ok(Json(ApiResponse {
        data: TranscriptsData {
            display_name: lookup_area(area_code.as_str()).map(|c| c.display_name),
            call_count: transcripts.len(),
            area_code,
            transcripts,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_call_timeline(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<WindowQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<TimelineBucketItem>>>, ApiError> {
    let Query(query) = query.map_err(|e| query_rejection(&req_id.0, &e))?;
    let window = resolve_window(
        &req_id.0,
        query.hours,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        DEFAULT_WINDOW_HOURS,
    )?;

    let rows = outage_db::list_call_timeline(&state.pool, &window)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| TimelineBucketItem {
            hour_label: row.bucket_start.format("%b %-d, %-I %p").to_string(),
            timestamp: row.bucket_start,
            call_count: row.call_count,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_call_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<WindowQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<CallStatsItem>>, ApiError> {
    let Query(query) = query.map_err(|e| query_rejection(&req_id.0, &e))?;
    let window = resolve_window(
        &req_id.0,
        query.hours,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        DEFAULT_WINDOW_HOURS,
    )?;

    let stats = outage_db::get_call_stats(&state.pool, &window)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: CallStatsItem {
            total_calls: stats.total_calls,
            unique_customers: stats.unique_customers,
            avg_duration_minutes: stats.avg_duration_minutes,
            last_call_time: stats.last_call_time,
            window: WindowItem::from(&window),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

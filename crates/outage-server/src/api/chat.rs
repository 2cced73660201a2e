use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use outage_core::{ChatMessage, DEFAULT_WINDOW_HOURS};
use outage_summary::ChatReply;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{
    json_rejection, map_pipeline_error, require_area_code, resolve_window, ApiError, ApiResponse,
    AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct ChatRequest {
    #[serde(alias = "zip")]
    pub area_code: Option<String>,
    pub hours: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// POST /api/v1/outages/chat: stateless follow-up question about one area.
///
/// The client sends the whole conversation each time and gets it back with
/// the reply appended.
pub(super) async fn chat(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChatReply>>, ApiError> {
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

    let reply = state
        .pipeline()
        .chat(&area_code, &window, body.messages)
        .await
        .map_err(|e| map_pipeline_error(rid.clone(), e))?;

    Ok(Json(ApiResponse {
        data: reply,
        meta: ResponseMeta::new(req_id.0),
    }))
}

mod alerts;
mod chat;
mod incidents;
mod outages;
mod social;
mod summary;

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        State,
    },
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use outage_core::{AreaCode, TimeWindow};
use outage_summary::{OutagePipeline, PipelineError, TextGenerator};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::inflight::InFlight;
use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// `None` when no text-generation credential is configured.
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub inflight: InFlight,
}

impl AppState {
    pub fn new(pool: PgPool, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            pool,
            generator,
            inflight: InFlight::default(),
        }
    }

    pub(super) fn pipeline(&self) -> OutagePipeline<PgPool> {
        OutagePipeline::new(self.pool.clone(), self.generator.clone())
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    text_generation: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details: None,
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "timeout_error" => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &outage_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "store_error", "database query failed")
        .with_details(serde_json::json!({ "detail": error.to_string() }))
}

pub(super) fn map_pipeline_error(request_id: String, error: PipelineError) -> ApiError {
    let code = error.category();
    match error {
        PipelineError::Validation(message) | PipelineError::NotFound(message) => {
            ApiError::new(request_id, code, message)
        }
        PipelineError::Configuration(message) => {
            tracing::error!(error = %message, "text generation is not configured");
            ApiError::new(request_id, code, "text-generation service is not configured")
                .with_details(serde_json::json!({ "detail": message }))
        }
        PipelineError::Store(e) => map_db_error(request_id, &e),
        PipelineError::Upstream { status, detail } => {
            tracing::error!(upstream_status = ?status, "text-generation service failed");
            ApiError::new(request_id, code, "text-generation service error").with_details(
                serde_json::json!({ "upstream_status": status, "detail": detail }),
            )
        }
        PipelineError::Timeout(secs) => {
            tracing::error!(timeout_secs = secs, "text-generation service timed out");
            ApiError::new(
                request_id,
                code,
                format!("text-generation service did not answer within {secs}s"),
            )
        }
    }
}

/// Body and query extraction failures surface as `validation_error`.
pub(super) fn json_rejection(request_id: &str, rejection: &JsonRejection) -> ApiError {
    ApiError::new(request_id, "validation_error", "invalid request body")
        .with_details(serde_json::json!({ "detail": rejection.body_text() }))
}

pub(super) fn query_rejection(request_id: &str, rejection: &QueryRejection) -> ApiError {
    ApiError::new(request_id, "validation_error", "invalid query parameters")
        .with_details(serde_json::json!({ "detail": rejection.body_text() }))
}

/// Parse a required area code from a request field.
pub(super) fn require_area_code(request_id: &str, raw: Option<&str>) -> Result<AreaCode, ApiError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        ApiError::new(request_id, "validation_error", "area_code is required")
    })?;
    AreaCode::parse(raw).map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))
}

/// Resolve `hours` or a `start_date`/`end_date` pair against the current time.
pub(super) fn resolve_window(
    request_id: &str,
    hours: Option<i64>,
    start_date: Option<&str>,
    end_date: Option<&str>,
    default_hours: i64,
) -> Result<TimeWindow, ApiError> {
    TimeWindow::from_params(hours, start_date, end_date, default_hours, Utc::now())
        .map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/outages", get(outages::list_outages))
        .route(
            "/api/v1/outages/transcripts",
            get(outages::list_outage_transcripts),
        )
        .route("/api/v1/outages/timeline", get(outages::list_call_timeline))
        .route("/api/v1/outages/stats", get(outages::get_call_stats))
        .route("/api/v1/outages/summary", post(summary::generate_summary))
        .route("/api/v1/outages/alert", post(alerts::handle_alert))
        .route("/api/v1/outages/chat", post(chat::chat))
        .route("/api/v1/incidents", get(incidents::list_incidents))
        .route("/api/v1/social-posts", get(social::list_social_posts))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let text_generation = if state.generator.is_some() {
        "configured"
    } else {
        "not_configured"
    };

    match outage_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                    text_generation,
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                        text_generation,
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

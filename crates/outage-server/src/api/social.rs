use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use outage_db::SocialPostFilters;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, query_rejection, resolve_window, ApiError, ApiResponse,
    AppState, ResponseMeta,
};

const DEFAULT_SOCIAL_WINDOW_HOURS: i64 = 168;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SocialPostsQuery {
    pub platform: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
    pub hours: Option<i64>,
    pub page: Option<i64>,
    #[serde(alias = "page_size")]
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SocialPostItem {
    id: i64,
    username: String,
    social_media: String,
    comment: String,
    location: Option<String>,
    timestamp: DateTime<Utc>,
    category: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SocialPostsData {
    posts: Vec<SocialPostItem>,
    total: i64,
    page: i64,
    page_size: i64,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// GET /api/v1/social-posts: filtered, paginated feed, newest first.
pub(super) async fn list_social_posts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SocialPostsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<SocialPostsData>>, ApiError> {
    let Query(query) = query.map_err(|e| query_rejection(&req_id.0, &e))?;
    let window = resolve_window(
        &req_id.0,
        query.hours,
        None,
        None,
        DEFAULT_SOCIAL_WINDOW_HOURS,
    )?;
    let page = query.page.unwrap_or(1).max(1);
    let page_size = normalize_limit(query.page_size);
    if (page - 1).checked_mul(page_size).is_none() {
        return Err(ApiError::new(
            &req_id.0,
            "validation_error",
            format!("page {page} is beyond the last addressable page"),
        ));
    }

    let filters = SocialPostFilters {
        since: window.since,
        platform: non_blank(query.platform.as_deref()),
        category: non_blank(query.category.as_deref()),
        location: non_blank(query.location.as_deref()),
        search: non_blank(query.search.as_deref()),
        page,
        page_size,
    };

    let result = outage_db::list_social_posts(&state.pool, &filters)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let posts = result
        .posts
        .into_iter()
        .map(|row| SocialPostItem {
            id: row.id,
            username: row.username,
            social_media: row.social_media,
            comment: row.comment,
            location: row.location,
            timestamp: row.posted_at,
            category: row.category,
        })
        .collect();

    Ok(Json(ApiResponse {
        data: SocialPostsData {
            posts,
            total: result.total,
            page,
            page_size,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

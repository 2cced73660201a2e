//! Filtered, paginated reads over `social_media_data`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// `$1` = since, `$2` = platform, `$3` = category, `$4` = location pattern,
/// `$5` = search pattern. Patterns arrive pre-escaped and wrapped in `%`.
macro_rules! social_where {
    () => {
        "WHERE \"timestamp\" >= $1 \
           AND ($2::TEXT IS NULL OR social_media = $2) \
           AND ($3::TEXT IS NULL OR category = $3) \
           AND ($4::TEXT IS NULL OR location ILIKE $4) \
           AND ($5::TEXT IS NULL OR comment ILIKE $5 OR username ILIKE $5) "
    };
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SocialPostRow {
    pub id: i64,
    pub username: String,
    pub social_media: String,
    pub comment: String,
    pub location: Option<String>,
    pub posted_at: DateTime<Utc>,
    pub category: Option<String>,
}

/// Input filters for the social feed. `platform` and `category` match
/// exactly; `location` and `search` are case-insensitive substring matches.
#[derive(Debug, Clone)]
pub struct SocialPostFilters<'a> {
    pub since: DateTime<Utc>,
    pub platform: Option<&'a str>,
    pub category: Option<&'a str>,
    pub location: Option<&'a str>,
    pub search: Option<&'a str>,
    /// 1-based.
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone)]
pub struct SocialPostPage {
    pub posts: Vec<SocialPostRow>,
    pub total: i64,
}

/// Return one page of posts (newest first) plus the total match count.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_social_posts(
    pool: &PgPool,
    filters: &SocialPostFilters<'_>,
) -> Result<SocialPostPage, DbError> {
    let location = filters.location.map(contains_pattern);
    let search = filters.search.map(contains_pattern);
    let offset = page_offset(filters.page, filters.page_size);

    let total: i64 = sqlx::query_scalar(concat!(
        "SELECT COUNT(*) FROM social_media_data ",
        social_where!()
    ))
    .bind(filters.since)
    .bind(filters.platform)
    .bind(filters.category)
    .bind(location.as_deref())
    .bind(search.as_deref())
    .fetch_one(pool)
    .await?;

    let posts = sqlx::query_as::<_, SocialPostRow>(concat!(
        "SELECT id, username, social_media, comment, location, \
                \"timestamp\" AS posted_at, category \
         FROM social_media_data ",
        social_where!(),
        "ORDER BY \"timestamp\" DESC, id DESC \
         LIMIT $6 OFFSET $7"
    ))
    .bind(filters.since)
    .bind(filters.platform)
    .bind(filters.category)
    .bind(location.as_deref())
    .bind(search.as_deref())
    .bind(filters.page_size)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(SocialPostPage { posts, total })
}

/// Row offset of a 1-based page. Saturates instead of overflowing.
fn page_offset(page: i64, page_size: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(page_size.max(0))
}

/// Wrap user text as an `ILIKE` substring pattern, escaping `LIKE` wildcards.
fn contains_pattern(raw: &str) -> String {
    let mut pattern = String::with_capacity(raw.len() + 2);
    pattern.push('%');
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

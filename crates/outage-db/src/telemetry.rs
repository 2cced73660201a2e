//! Read-model queries over `call_data`, `transcript_data`, and `customers`.
//!
//! Every query here is restricted to technical-support calls. The area code
//! is derived in SQL by one shared expression so the per-area aggregate and
//! the area-filtered transcript list always bucket calls identically. The
//! Rust mirror of the rule is `outage_core::AreaCode::from_sources`.

use chrono::{DateTime, Utc};
use outage_core::{AreaCode, TimeWindow};
use sqlx::PgPool;

use crate::DbError;

/// Area code from the customer's `location` column, falling back to the
/// trailing five digits of `service_address`. Expects the customer table to
/// be aliased `c`.
macro_rules! area_code_expr {
    () => {
        "COALESCE(SUBSTRING(c.location FROM '([0-9]{5})\\s*$'), \
                  SUBSTRING(c.service_address FROM '([0-9]{5})\\s*$'))"
    };
}

/// Join + filter shared by every query. Binds `$1` = window start and
/// `$2` = optional exclusive window end.
macro_rules! technical_calls_from {
    () => {
        "FROM call_data cd \
         JOIN transcript_data td ON td.call_id = cd.call_id \
         JOIN customers c ON c.customer_id = cd.customer_id \
         WHERE td.call_reason = 'technical_support' \
           AND cd.startdatetime >= $1 \
           AND ($2::TIMESTAMPTZ IS NULL OR cd.startdatetime < $2) "
    };
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// Per-area rollup of technical-support calls.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AreaAggregateRow {
    pub area_code: String,
    pub call_count: i64,
    pub avg_duration_minutes: f64,
    pub customer_ids: Vec<String>,
}

/// One technical-support call joined to its transcript and customer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TranscriptRow {
    pub call_id: i64,
    pub customer_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub call_reason: String,
    pub transcript: String,
    pub location: Option<String>,
    pub service_address: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TimelineBucketRow {
    pub bucket_start: DateTime<Utc>,
    pub call_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CallStatsRow {
    pub total_calls: i64,
    pub unique_customers: i64,
    pub avg_duration_minutes: f64,
    pub last_call_time: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Aggregate technical-support calls per area for the window.
///
/// Calls whose customer has no derivable area code are excluded. Results are
/// ordered by `call_count DESC`, ties broken by area code.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_area_aggregates(
    pool: &PgPool,
    window: &TimeWindow,
) -> Result<Vec<AreaAggregateRow>, DbError> {
    let rows = sqlx::query_as::<_, AreaAggregateRow>(concat!(
        "WITH tech_calls AS ( \
             SELECT cd.call_id, cd.customer_id, cd.startdatetime, cd.enddatetime, ",
        area_code_expr!(),
        " AS area_code ",
        technical_calls_from!(),
        ") \
         SELECT \
             area_code, \
             COUNT(DISTINCT call_id) AS call_count, \
             COALESCE(AVG(EXTRACT(EPOCH FROM (enddatetime - startdatetime)) / 60.0), 0)::DOUBLE PRECISION \
                 AS avg_duration_minutes, \
             ARRAY_AGG(DISTINCT customer_id ORDER BY customer_id) AS customer_ids \
         FROM tech_calls \
         WHERE area_code IS NOT NULL \
         GROUP BY area_code \
         ORDER BY call_count DESC, area_code ASC"
    ))
    .bind(window.since)
    .bind(window.until)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// List every technical-support call for one area within the window, oldest
/// first. An empty result is returned as-is; callers decide whether that is
/// a not-found condition.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_area_transcripts(
    pool: &PgPool,
    area_code: &AreaCode,
    window: &TimeWindow,
) -> Result<Vec<TranscriptRow>, DbError> {
    let rows = sqlx::query_as::<_, TranscriptRow>(concat!(
        "SELECT \
             cd.call_id, cd.customer_id, \
             cd.startdatetime AS started_at, cd.enddatetime AS ended_at, \
             td.call_reason, td.transcript, \
             c.location, c.service_address ",
        technical_calls_from!(),
        " AND ",
        area_code_expr!(),
        " = $3 \
         ORDER BY cd.startdatetime ASC, cd.call_id ASC"
    ))
    .bind(window.since)
    .bind(window.until)
    .bind(area_code.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Hourly technical-support call counts across all areas, oldest bucket first.
/// Hours with no calls are omitted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_call_timeline(
    pool: &PgPool,
    window: &TimeWindow,
) -> Result<Vec<TimelineBucketRow>, DbError> {
    let rows = sqlx::query_as::<_, TimelineBucketRow>(concat!(
        "SELECT \
             date_trunc('hour', cd.startdatetime AT TIME ZONE 'UTC') AT TIME ZONE 'UTC' AS bucket_start, \
             COUNT(*) AS call_count ",
        technical_calls_from!(),
        "GROUP BY bucket_start \
         ORDER BY bucket_start ASC"
    ))
    .bind(window.since)
    .bind(window.until)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Headline numbers for the stat cards.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_call_stats(pool: &PgPool, window: &TimeWindow) -> Result<CallStatsRow, DbError> {
    let row = sqlx::query_as::<_, CallStatsRow>(concat!(
        "SELECT \
             COUNT(*) AS total_calls, \
             COUNT(DISTINCT cd.customer_id) AS unique_customers, \
             COALESCE(AVG(EXTRACT(EPOCH FROM (cd.enddatetime - cd.startdatetime)) / 60.0), 0)::DOUBLE PRECISION \
                 AS avg_duration_minutes, \
             MAX(cd.startdatetime) AS last_call_time ",
        technical_calls_from!()
    ))
    .bind(window.since)
    .bind(window.until)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

//! Database operations for the `confirmed_incidents` table.

use chrono::{DateTime, Utc};
use outage_core::{IncidentStatus, IncidentSubmission};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `confirmed_incidents` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConfirmedIncidentRow {
    pub id: i64,
    pub area_code: String,
    pub outage_start_time: DateTime<Utc>,
    pub outage_end_time: DateTime<Utc>,
    pub affected_customers: i32,
    pub incident_summary: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insert one confirmed incident with status `Unresolved` and `created_at`
/// set by the database clock.
///
/// There is no dedup: submitting the same payload twice yields two rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_confirmed_incident(
    pool: &PgPool,
    incident: &IncidentSubmission,
) -> Result<ConfirmedIncidentRow, DbError> {
    let row = sqlx::query_as::<_, ConfirmedIncidentRow>(
        "INSERT INTO confirmed_incidents \
             (area_code, outage_start_time, outage_end_time, affected_customers, \
              incident_summary, status, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, NOW()) \
         RETURNING id, area_code, outage_start_time, outage_end_time, affected_customers, \
                   incident_summary, status, created_at",
    )
    .bind(incident.area_code.as_str())
    .bind(incident.outage_start)
    .bind(incident.outage_end)
    .bind(incident.affected_customers)
    .bind(&incident.summary_text)
    .bind(IncidentStatus::Unresolved.as_str())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// List confirmed incidents newest first, optionally for one area.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_confirmed_incidents(
    pool: &PgPool,
    area_code: Option<&str>,
    limit: i64,
) -> Result<Vec<ConfirmedIncidentRow>, DbError> {
    let rows = sqlx::query_as::<_, ConfirmedIncidentRow>(
        "SELECT id, area_code, outage_start_time, outage_end_time, affected_customers, \
                incident_summary, status, created_at \
         FROM confirmed_incidents \
         WHERE ($1::TEXT IS NULL OR area_code = $1) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(area_code)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AreaCode, CoreError};

/// One technical-support call with its transcript, as seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallTranscript {
    pub call_id: i64,
    pub customer_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub area_code: AreaCode,
    pub transcript: String,
}

impl CallTranscript {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_minutes(&self) -> f64 {
        (self.ended_at - self.started_at).num_seconds() as f64 / 60.0
    }
}

/// Technical-support calls for one area within one window, with the metrics
/// the dashboard and summaries report.
///
/// `call_count` counts calls; `affected_customer_count` counts distinct
/// customers, so `affected_customer_count <= call_count` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutageWindow {
    pub area_code: AreaCode,
    pub call_count: usize,
    pub earliest_start: DateTime<Utc>,
    pub latest_end: DateTime<Utc>,
    pub affected_customer_count: usize,
    /// Ordered by call start time.
    pub transcripts: Vec<CallTranscript>,
}

/// Lifecycle state of a confirmed incident. New rows are always `Unresolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IncidentStatus {
    #[default]
    Unresolved,
    Investigating,
    Resolved,
}

impl IncidentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unresolved => "Unresolved",
            Self::Investigating => "Investigating",
            Self::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator-confirmed incident ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentSubmission {
    pub area_code: AreaCode,
    pub outage_start: DateTime<Utc>,
    pub outage_end: DateTime<Utc>,
    pub affected_customers: i32,
    pub summary_text: String,
}

impl IncidentSubmission {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRecord`] if the bounds are inverted, the
    /// customer count is negative, or the summary is blank.
    pub fn new(
        area_code: AreaCode,
        outage_start: DateTime<Utc>,
        outage_end: DateTime<Utc>,
        affected_customers: i32,
        summary_text: &str,
    ) -> Result<Self, CoreError> {
        if outage_start > outage_end {
            return Err(CoreError::InvalidRecord(
                "outage_start_time must not be after outage_end_time".to_string(),
            ));
        }
        if affected_customers < 0 {
            return Err(CoreError::InvalidRecord(
                "affected_customers must not be negative".to_string(),
            ));
        }
        let summary_text = summary_text.trim();
        if summary_text.is_empty() {
            return Err(CoreError::InvalidRecord(
                "incident_summary must not be empty".to_string(),
            ));
        }
        Ok(Self {
            area_code,
            outage_start,
            outage_end,
            affected_customers,
            summary_text: summary_text.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of an operator conversation. The caller owns the history; the
/// server never stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

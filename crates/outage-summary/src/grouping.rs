//! Typed conversion of store rows and outage metrics.

use std::collections::HashSet;

use outage_core::{AreaCode, CallTranscript, OutageWindow};
use outage_db::TranscriptRow;

use crate::error::PipelineError;

/// Validate a raw store row into a [`CallTranscript`].
///
/// # Errors
///
/// Returns [`PipelineError::Validation`] if the row has no customer, inverted
/// call times, or no derivable area code.
pub fn call_from_row(row: TranscriptRow) -> Result<CallTranscript, PipelineError> {
    if row.customer_id.trim().is_empty() {
        return Err(PipelineError::Validation(format!(
            "call {} has no customer id",
            row.call_id
        )));
    }
    if row.started_at > row.ended_at {
        return Err(PipelineError::Validation(format!(
            "call {} ends before it starts",
            row.call_id
        )));
    }
    let area_code = AreaCode::from_sources(row.location.as_deref(), row.service_address.as_deref())
        .ok_or_else(|| {
            PipelineError::Validation(format!("call {} has no derivable area code", row.call_id))
        })?;

    Ok(CallTranscript {
        call_id: row.call_id,
        customer_id: row.customer_id,
        started_at: row.started_at,
        ended_at: row.ended_at,
        area_code,
        transcript: row.transcript,
    })
}

/// Compute the outage window for one area's calls.
///
/// Returns `None` for an empty call list; callers report that as not-found
/// before getting here.
#[must_use]
pub fn build_outage_window(area_code: AreaCode, calls: Vec<CallTranscript>) -> Option<OutageWindow> {
    let earliest_start = calls.iter().map(|c| c.started_at).min()?;
    let latest_end = calls.iter().map(|c| c.ended_at).max()?;
    let affected_customer_count = calls
        .iter()
        .map(|c| c.customer_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut transcripts = calls;
    transcripts.sort_by_key(|c| (c.started_at, c.call_id));

    Some(OutageWindow {
        area_code,
        call_count: transcripts.len(),
        earliest_start,
        latest_end,
        affected_customer_count,
        transcripts,
    })
}

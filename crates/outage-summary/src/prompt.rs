//! Prompt construction for summaries and operator chat.
//!
//! Every transcript is clipped independently before it is joined into the
//! prompt, so one runaway call cannot crowd out the rest.

use chrono::{DateTime, Utc};
use outage_core::{lookup_area, AreaCode, OutageWindow};

pub const MAX_TRANSCRIPT_CHARS: usize = 1500;
pub const TRUNCATION_MARKER: &str = "...[truncated]";
pub const SUMMARY_MAX_OUTPUT_TOKENS: u32 = 512;
pub const CHAT_MAX_OUTPUT_TOKENS: u32 = 1024;

const TRANSCRIPT_DELIMITER: &str = "\n\n---\n\n";

/// Which audience a summary is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryVariant {
    /// Terse text for the network-operations alert.
    Alert,
    /// Fuller overview for the support analyst.
    Analyst,
}

impl SummaryVariant {
    /// The single user turn sent alongside the system prompt.
    #[must_use]
    pub fn request_text(self) -> &'static str {
        match self {
            Self::Alert => "Generate the incident summary based on the call transcripts provided.",
            Self::Analyst => "Generate the summary based on the call transcripts provided.",
        }
    }

    #[must_use]
    pub fn max_output_tokens(self) -> u32 {
        SUMMARY_MAX_OUTPUT_TOKENS
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Analyst => "analyst",
        }
    }
}

/// Clip a transcript to [`MAX_TRANSCRIPT_CHARS`] characters.
///
/// Short transcripts pass through untouched; long ones are cut and get
/// [`TRUNCATION_MARKER`] appended.
#[must_use]
pub fn truncate_transcript(transcript: &str) -> String {
    match transcript.char_indices().nth(MAX_TRANSCRIPT_CHARS) {
        None => transcript.to_string(),
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &transcript[..cut]),
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y %-I:%M %p UTC").to_string()
}

fn area_label(area_code: &AreaCode) -> String {
    match lookup_area(area_code.as_str()) {
        Some(coord) => format!("{} ({})", coord.display_name, area_code),
        None => area_code.to_string(),
    }
}

/// Render every call as a numbered block, separated by a delimiter line.
#[must_use]
pub fn format_transcript_block(window: &OutageWindow) -> String {
    window
        .transcripts
        .iter()
        .enumerate()
        .map(|(idx, call)| {
            format!(
                "Call {} (Time: {}, Location: {}):\n{}",
                idx + 1,
                format_timestamp(call.started_at),
                area_label(&call.area_code),
                truncate_transcript(&call.transcript)
            )
        })
        .collect::<Vec<_>>()
        .join(TRANSCRIPT_DELIMITER)
}

fn context_line(window: &OutageWindow) -> String {
    format!(
        "You have {} call transcript(s) from area code {} spanning from {} to {}, affecting {} unique customer(s).",
        window.call_count,
        window.area_code,
        format_timestamp(window.earliest_start),
        format_timestamp(window.latest_end),
        window.affected_customer_count
    )
}

/// Build the system prompt for a one-shot summary.
#[must_use]
pub fn summary_prompt(window: &OutageWindow, variant: SummaryVariant) -> String {
    let transcripts = format_transcript_block(window);
    let context = context_line(window);
    match variant {
        SummaryVariant::Alert => format!(
            "You are an AI assistant analyzing technical support call transcripts to generate a concise incident summary for network operations.

{context}

Generate a professional incident summary (2-4 sentences) that includes:
1. The primary technical issue or issues affecting customers
2. Common symptoms and problems reported across calls
3. Affected services or infrastructure components
4. Geographic scope and customer impact

Be concise, factual, and focus on actionable information for the network operations team.

Call transcripts:

{transcripts}"
        ),
        SummaryVariant::Analyst => format!(
            "You are an AI assistant analyzing technical support call transcripts to provide an initial overview of a potential outage.

{context}

Generate a comprehensive but concise summary (3-5 sentences) that includes:
1. The primary technical issue or issues affecting customers
2. Common symptoms and problems reported across calls
3. Affected services or infrastructure components
4. Patterns in timing or geographic distribution
5. Overall severity and customer impact

Be conversational but professional, as this will be shown to a support analyst reviewing the outage.

Call transcripts:

{transcripts}"
        ),
    }
}

/// Build the system prompt for an operator follow-up conversation.
#[must_use]
pub fn chat_prompt(window: &OutageWindow) -> String {
    let transcripts = format_transcript_block(window);
    let context = context_line(window);
    format!(
        "You are an AI assistant helping a support analyst investigate a potential network outage using technical support call transcripts.

{context}

Answer the analyst's questions using only the call transcripts below. If the transcripts do not contain the answer, say so plainly. Keep answers short and specific.

Call transcripts:

{transcripts}"
    )
}

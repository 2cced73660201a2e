use std::sync::Arc;

use chrono::{DateTime, Utc};
use outage_core::{AreaCode, ChatMessage, ChatRole, OutageWindow, TimeWindow};
use serde::Serialize;

use crate::error::PipelineError;
use crate::generator::TextGenerator;
use crate::grouping::{build_outage_window, call_from_row};
use crate::prompt::{chat_prompt, summary_prompt, SummaryVariant, CHAT_MAX_OUTPUT_TOKENS};
use crate::store::TranscriptStore;

/// Generated text plus the metrics it was generated from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentSummary {
    pub area_code: AreaCode,
    pub outage_start: DateTime<Utc>,
    pub outage_end: DateTime<Utc>,
    pub affected_customers: usize,
    pub call_count: usize,
    pub summary_text: String,
}

/// One chat turn: the reply and the full history with the reply appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub messages: Vec<ChatMessage>,
    pub call_count: usize,
    pub affected_customers: usize,
}

/// Transcript lookup, outage grouping, and text generation for one area.
///
/// Holds no per-request state. A missing generator means the credential was
/// never configured; every generating operation fails fast on that before
/// touching the store.
pub struct OutagePipeline<S> {
    store: S,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl<S: TranscriptStore> OutagePipeline<S> {
    pub fn new(store: S, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { store, generator }
    }

    fn require_generator(&self) -> Result<&Arc<dyn TextGenerator>, PipelineError> {
        self.generator.as_ref().ok_or_else(|| {
            PipelineError::Configuration(
                "text-generation API key is not configured (set ANTHROPIC_API_KEY)".to_string(),
            )
        })
    }

    /// Load and group one area's technical-support calls.
    ///
    /// # Errors
    ///
    /// [`PipelineError::NotFound`] when no calls match,
    /// [`PipelineError::Validation`] for malformed rows, and
    /// [`PipelineError::Store`] for query failures.
    pub async fn outage_window(
        &self,
        area_code: &AreaCode,
        window: &TimeWindow,
    ) -> Result<OutageWindow, PipelineError> {
        let rows = self.store.area_transcripts(area_code, window).await?;
        if rows.is_empty() {
            return Err(PipelineError::NotFound(format!(
                "no technical-support calls for area {area_code} in the requested window"
            )));
        }

        let mut calls = Vec::with_capacity(rows.len());
        for row in rows {
            let call = call_from_row(row)?;
            if call.area_code != *area_code {
                return Err(PipelineError::Validation(format!(
                    "call {} belongs to area {}, not {area_code}",
                    call.call_id, call.area_code
                )));
            }
            calls.push(call);
        }

        build_outage_window(area_code.clone(), calls).ok_or_else(|| {
            PipelineError::NotFound(format!("no technical-support calls for area {area_code}"))
        })
    }

    /// Generate a one-shot incident summary.
    ///
    /// The generator is called exactly once; failures are not retried.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Configuration`] if no generator is configured, plus
    /// everything [`OutagePipeline::outage_window`] returns, plus
    /// [`PipelineError::Upstream`] / [`PipelineError::Timeout`] from the
    /// service.
    pub async fn summarize(
        &self,
        area_code: &AreaCode,
        window: &TimeWindow,
        variant: SummaryVariant,
    ) -> Result<IncidentSummary, PipelineError> {
        let generator = self.require_generator()?;
        let outage = self.outage_window(area_code, window).await?;

        tracing::info!(
            area_code = %area_code,
            variant = variant.as_str(),
            calls = outage.call_count,
            customers = outage.affected_customer_count,
            generator = generator.name(),
            "generating incident summary"
        );

        let system_prompt = summary_prompt(&outage, variant);
        let request = [ChatMessage::user(variant.request_text())];
        let summary_text = generator
            .generate(&system_prompt, &request, variant.max_output_tokens())
            .await
            .inspect_err(|e| tracing::warn!(area_code = %area_code, error = %e, "summary generation failed"))?;

        Ok(IncidentSummary {
            area_code: outage.area_code,
            outage_start: outage.earliest_start,
            outage_end: outage.latest_end,
            affected_customers: outage.affected_customer_count,
            call_count: outage.call_count,
            summary_text,
        })
    }

    /// Answer the latest operator question about one area's outage.
    ///
    /// The window is rebuilt on every call; `history` is the caller's whole
    /// conversation and must end with a user turn.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Validation`] for an unusable history, otherwise the
    /// same as [`OutagePipeline::summarize`].
    pub async fn chat(
        &self,
        area_code: &AreaCode,
        window: &TimeWindow,
        history: Vec<ChatMessage>,
    ) -> Result<ChatReply, PipelineError> {
        validate_history(&history)?;
        let generator = self.require_generator()?;
        let outage = self.outage_window(area_code, window).await?;

        tracing::info!(
            area_code = %area_code,
            turns = history.len(),
            calls = outage.call_count,
            "answering outage chat"
        );

        let system_prompt = chat_prompt(&outage);
        let reply = generator
            .generate(&system_prompt, &history, CHAT_MAX_OUTPUT_TOKENS)
            .await?;

        let mut messages = history;
        messages.push(ChatMessage::assistant(reply.clone()));

        Ok(ChatReply {
            reply,
            messages,
            call_count: outage.call_count,
            affected_customers: outage.affected_customer_count,
        })
    }
}

fn validate_history(history: &[ChatMessage]) -> Result<(), PipelineError> {
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return Err(PipelineError::Validation(
            "messages must contain at least one message".to_string(),
        ));
    };
    if first.role != ChatRole::User {
        return Err(PipelineError::Validation(
            "conversation must start with a user message".to_string(),
        ));
    }
    if last.role != ChatRole::User {
        return Err(PipelineError::Validation(
            "conversation must end with a user message".to_string(),
        ));
    }
    if let Some(idx) = history.iter().position(|m| m.content.trim().is_empty()) {
        return Err(PipelineError::Validation(format!(
            "message {idx} has empty content"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;

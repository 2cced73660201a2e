//! Outage grouping and incident summarization.
//!
//! Reads technical-support transcripts for one area and window, computes the
//! outage metrics, and turns the transcripts into natural-language text via
//! an external text-generation service. The store and the service are both
//! injected behind traits so the pipeline runs against fakes in tests.

pub mod anthropic;
pub mod error;
pub mod generator;
pub mod grouping;
pub mod pipeline;
pub mod prompt;
pub mod store;

pub use anthropic::AnthropicClient;
pub use error::{GeneratorError, PipelineError};
pub use generator::TextGenerator;
pub use grouping::{build_outage_window, call_from_row};
pub use pipeline::{ChatReply, IncidentSummary, OutagePipeline};
pub use prompt::{SummaryVariant, CHAT_MAX_OUTPUT_TOKENS, MAX_TRANSCRIPT_CHARS, TRUNCATION_MARKER};
pub use store::TranscriptStore;

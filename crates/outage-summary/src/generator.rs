use async_trait::async_trait;
use outage_core::ChatMessage;

use crate::error::GeneratorError;

/// A service that turns a system prompt plus a conversation into text.
///
/// Implementations make exactly one attempt per call; retries, if any, are
/// the operator's decision.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        conversation: &[ChatMessage],
        max_output_tokens: u32,
    ) -> Result<String, GeneratorError>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

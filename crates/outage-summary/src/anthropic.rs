//! HTTP client for the Anthropic Messages API.
//!
//! Wraps `reqwest` with API-key headers, a per-request timeout, and typed
//! response decoding. Any non-2xx answer is surfaced as
//! [`GeneratorError::Upstream`] carrying the raw response body.

use std::time::Duration;

use async_trait::async_trait;
use outage_core::{AppConfig, ChatMessage};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;
use crate::generator::TextGenerator;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for `POST /v1/messages`.
///
/// Use [`AnthropicClient::new`] for production or
/// [`AnthropicClient::with_base_url`] to point at a mock server in tests.
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, GeneratorError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`GeneratorError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeneratorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("outage-dashboard/0.1 (incident-summaries)")
            .build()?;

        let endpoint = Url::parse(&format!("{}/v1/messages", base_url.trim_end_matches('/')))
            .map_err(|_| GeneratorError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            endpoint,
            timeout_secs,
        })
    }

    /// Build a client from application config, or `None` when no API key is
    /// configured.
    ///
    /// # Errors
    ///
    /// Same as [`AnthropicClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, GeneratorError> {
        config
            .llm_api_key
            .as_deref()
            .map(|key| {
                Self::with_base_url(
                    key,
                    &config.llm_model,
                    config.llm_timeout_secs,
                    &config.llm_base_url,
                )
            })
            .transpose()
    }

    fn map_transport_error(&self, err: reqwest::Error) -> GeneratorError {
        if err.is_timeout() {
            GeneratorError::Timeout(self.timeout_secs)
        } else {
            GeneratorError::Http(err)
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(
        &self,
        system_prompt: &str,
        conversation: &[ChatMessage],
        max_output_tokens: u32,
    ) -> Result<String, GeneratorError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: max_output_tokens,
            system: system_prompt,
            messages: conversation,
        };

        tracing::debug!(
            model = %self.model,
            max_tokens = max_output_tokens,
            messages = conversation.len(),
            "sending text-generation request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "text-generation service returned an error");
            return Err(GeneratorError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| GeneratorError::MalformedResponse(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| GeneratorError::MalformedResponse("no text content block".to_string()))
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

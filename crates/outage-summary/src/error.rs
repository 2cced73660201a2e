use outage_core::CoreError;
use outage_db::DbError;
use thiserror::Error;

/// Errors returned by a [`crate::TextGenerator`].
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The service answered with a non-2xx status.
    #[error("text-generation service returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// No response within the configured timeout.
    #[error("text-generation request timed out after {0}s")]
    Timeout(u64),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A 2xx response whose body did not contain generated text.
    #[error("malformed text-generation response: {0}")]
    MalformedResponse(String),

    #[error("invalid text-generation base URL '{0}'")]
    InvalidBaseUrl(String),
}

/// Failure categories surfaced by the summarization pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing or malformed input, including malformed store rows.
    #[error("{0}")]
    Validation(String),

    /// No technical-support calls matched the area and window.
    #[error("{0}")]
    NotFound(String),

    /// The text-generation credential is not configured.
    #[error("{0}")]
    Configuration(String),

    #[error("store error: {0}")]
    Store(#[from] DbError),

    /// The text-generation service failed; `status` is absent for
    /// transport-level failures.
    #[error("text-generation service error: {detail}")]
    Upstream { status: Option<u16>, detail: String },

    #[error("text-generation service timed out after {0}s")]
    Timeout(u64),
}

impl PipelineError {
    /// Stable machine-readable category, used as the API error code.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Configuration(_) => "configuration_error",
            Self::Store(_) => "store_error",
            Self::Upstream { .. } => "upstream_error",
            Self::Timeout(_) => "timeout_error",
        }
    }
}

impl From<GeneratorError> for PipelineError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::Upstream { status, body } => Self::Upstream {
                status: Some(status),
                detail: body,
            },
            GeneratorError::Timeout(secs) => Self::Timeout(secs),
            other @ (GeneratorError::Http(_)
            | GeneratorError::MalformedResponse(_)
            | GeneratorError::InvalidBaseUrl(_)) => Self::Upstream {
                status: None,
                detail: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for PipelineError {
    fn from(err: CoreError) -> Self {
        Self::Validation(err.to_string())
    }
}

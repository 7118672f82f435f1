//! Error types for incident analysis

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::service::llm::GenerationError;

/// Stable, matchable error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigurationError,
    RateLimitError,
    UpstreamError,
    ParseError,
    NetworkError,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigurationError => "configuration_error",
            ErrorKind::RateLimitError => "rate_limit_error",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::Cancelled => "cancelled",
        }
    }

    /// Whether retrying the same request later can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimitError | ErrorKind::UpstreamError | ErrorKind::NetworkError
        )
    }
}

/// Error type for incident analysis
///
/// The `Display` text carries diagnostics for logs; use
/// [`AnalysisError::user_message`] for text shown to operators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error("Configuration missing: {0}")]
    Configuration(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Invalid structured output: {0}")]
    Parse(String),

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Configuration(_) => ErrorKind::ConfigurationError,
            AnalysisError::RateLimit => ErrorKind::RateLimitError,
            AnalysisError::Upstream(_) => ErrorKind::UpstreamError,
            AnalysisError::Parse(_) => ErrorKind::ParseError,
            AnalysisError::Network(_) => ErrorKind::NetworkError,
            AnalysisError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Text suitable for showing to the operator
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::Configuration(_) => {
                "The assistant is not configured: GEMINI_API_KEY is missing. Please contact the event technology team."
            }
            AnalysisError::RateLimit => "Rate limit exceeded. Please wait a minute and try again.",
            AnalysisError::Upstream(_) => {
                "The assistant encountered an issue while generating advice. Please try again in a moment."
            }
            AnalysisError::Parse(_) => {
                "I'm having trouble processing the response. Please try rephrasing your question or try again in a moment."
            }
            AnalysisError::Network(_) => "Network error. Please check your connection and try again.",
            AnalysisError::Cancelled => "The request was cancelled.",
        }
    }

    /// Render for callers that forward errors as JSON
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.kind().as_str().to_string(),
            message: self.user_message().to_string(),
            request_id: Uuid::new_v4().to_string(),
        }
    }
}

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique request ID for tracing
    pub request_id: String,
}

impl From<GenerationError> for AnalysisError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingCredential => {
                AnalysisError::Configuration("GEMINI_API_KEY is not set".to_string())
            }
            GenerationError::RateLimited => AnalysisError::RateLimit,
            GenerationError::UpstreamStatus { status, body } => {
                AnalysisError::Upstream(format!("status {}: {}", status.as_u16(), body))
            }
            GenerationError::EmptyPayload => AnalysisError::Upstream("empty payload".to_string()),
            GenerationError::MalformedEnvelope(msg) => AnalysisError::Parse(msg),
            GenerationError::Network(e) => AnalysisError::Network(e.to_string()),
        }
    }
}

//! Generation service client
//!
//! Sends one instruction text to Gemini `generateContent` and returns the raw
//! text of the first candidate. No retries are performed here.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::model::GenerationSettings;
use crate::model::gemini::{
    ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};

/// Low randomness so identical incidents get consistent assessments
pub const TEMPERATURE: f32 = 0.2;

/// Hard cap on generated output
pub const MAX_OUTPUT_TOKENS: u32 = 2000;

/// Structured output mode
pub const RESPONSE_MIME_TYPE: &str = "application/json";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("Missing generation service credential")]
    MissingCredential,

    #[error("Rate limited by generation service")]
    RateLimited,

    #[error("Unexpected status {status}: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    #[error("Generation service returned an empty payload")]
    EmptyPayload,

    #[error("Failed to parse response envelope: {0}")]
    MalformedEnvelope(String),

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Anything that can turn instruction text into raw generated text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Perform exactly one generation call
    async fn generate(&self, instructions: &str) -> Result<String, GenerationError>;
}

/// Client for the Gemini REST API
pub struct GeminiClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    /// Create a client from connection settings
    ///
    /// A missing API key is not an error here; every call fails with
    /// [`GenerationError::MissingCredential`] until one is configured.
    pub fn new(settings: &GenerationSettings) -> Result<Self, String> {
        let endpoint = build_endpoint(&settings.base_url, &settings.model)?;

        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        tracing::info!(
            model = %settings.model,
            endpoint = %endpoint,
            credential_configured = settings.api_key.is_some(),
            "Generation client initialized"
        );

        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        })
    }

    /// Model name requests are sent to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Fixed generation policy sent with every request
    pub fn generation_config() -> GenerationConfig {
        GenerationConfig {
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
            response_mime_type: RESPONSE_MIME_TYPE.to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, instructions: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredential)?;

        let request = GenerateContentRequest::user_text(instructions, Self::generation_config());

        tracing::debug!(
            model = %self.model,
            prompt_length = instructions.len(),
            "Sending generation request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        extract_payload(status, &body)
    }
}

/// `{base}/models/{model}:generateContent`
fn build_endpoint(base_url: &str, model: &str) -> Result<Url, String> {
    let base = base_url.trim_end_matches('/');
    let endpoint = format!("{}/models/{}:generateContent", base, model);
    Url::parse(&endpoint).map_err(|e| format!("Invalid generation endpoint '{}': {}", endpoint, e))
}

/// Classify a response and pull out the first candidate's text
fn extract_payload(status: StatusCode, body: &str) -> Result<String, GenerationError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!("Generation service rate limited");
        return Err(GenerationError::RateLimited);
    }

    if !status.is_success() {
        let api_error = serde_json::from_str::<ApiErrorEnvelope>(body)
            .ok()
            .map(|e| e.error);
        let error_code = api_error.as_ref().and_then(|e| e.code);
        let error_status = api_error.as_ref().and_then(|e| e.status.clone());
        let detail = api_error
            .and_then(|e| e.message)
            .unwrap_or_else(|| body.chars().take(200).collect());
        tracing::error!(
            status = status.as_u16(),
            error_code = ?error_code,
            error_status = ?error_status,
            detail = %detail,
            "Generation request failed"
        );
        return Err(GenerationError::UpstreamStatus {
            status,
            body: detail,
        });
    }

    let envelope: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedEnvelope(e.to_string()))?;

    let text = envelope.first_text().unwrap_or_default();
    if text.trim().is_empty() {
        let finish_reason = envelope
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .unwrap_or("none");
        tracing::warn!(
            candidates = envelope.candidates.len(),
            finish_reason = %finish_reason,
            "Generation service returned no text"
        );
        return Err(GenerationError::EmptyPayload);
    }

    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: Option<&str>) -> GenerationSettings {
        GenerationSettings {
            api_key: api_key.map(str::to_string),
            // Unroutable: any attempted request would fail as a network error
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_endpoint_includes_model() {
        let url = build_endpoint("https://example.com/v1beta/", "gemini-2.5-flash").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert!(build_endpoint("not a url", "m").is_err());
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_request() {
        let client = GeminiClient::new(&settings(None)).unwrap();
        let result = client.generate("instructions").await;
        assert!(matches!(result, Err(GenerationError::MissingCredential)));
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerateContentRequest::user_text("hello", GeminiClient::generation_config());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2000);
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        let temperature = value["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_rate_limit_is_distinct() {
        let result = extract_payload(StatusCode::TOO_MANY_REQUESTS, "{}");
        assert!(matches!(result, Err(GenerationError::RateLimited)));
    }

    #[test]
    fn test_other_status_is_upstream_error() {
        let body = r#"{"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}"#;
        match extract_payload(StatusCode::SERVICE_UNAVAILABLE, body) {
            Err(GenerationError::UpstreamStatus { status, body }) => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "The model is overloaded.");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_error_envelope_fields() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        let envelope: ApiErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.error.code, Some(400));
        assert_eq!(envelope.error.status.as_deref(), Some("INVALID_ARGUMENT"));

        let fallback = extract_payload(StatusCode::BAD_REQUEST, "plain text failure");
        assert!(matches!(
            fallback,
            Err(GenerationError::UpstreamStatus { body, .. }) if body == "plain text failure"
        ));
    }

    #[test]
    fn test_first_candidate_text_is_returned() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "{\"isGeneralQuery\": true}"}, {"text": "ignored"}]}},
                {"content": {"role": "model", "parts": [{"text": "second"}]}}
            ]
        }"#;
        let text = extract_payload(StatusCode::OK, body).unwrap();
        assert_eq!(text, r#"{"isGeneralQuery": true}"#);
    }

    #[test]
    fn test_empty_payload() {
        let no_candidates = extract_payload(StatusCode::OK, r#"{"candidates": []}"#);
        assert!(matches!(no_candidates, Err(GenerationError::EmptyPayload)));

        let blank_text = extract_payload(
            StatusCode::OK,
            r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}, "finishReason": "MAX_TOKENS"}]}"#,
        );
        assert!(matches!(blank_text, Err(GenerationError::EmptyPayload)));
    }

    #[test]
    fn test_malformed_envelope() {
        let result = extract_payload(StatusCode::OK, "<html>gateway</html>");
        assert!(matches!(result, Err(GenerationError::MalformedEnvelope(_))));
    }
}

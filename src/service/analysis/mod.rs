//! Incident analysis service
//!
//! Public entry point: classifies a message as a general query or an incident
//! and, for incidents, assesses Likelihood and Impact and produces one
//! actionable instruction.

use std::future::Future;
use std::sync::Arc;

use uuid::Uuid;

use crate::model::{AnalysisOutcome, KnowledgeBase, PipelineStrategy};
use crate::service::llm::TextGenerator;

pub mod converters;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod validation;

pub use error::{AnalysisError, ErrorKind, ErrorResponse};
pub use pipeline::{ClassificationPipeline, SinglePassPipeline, TwoPassPipeline, build_pipeline};

/// Strategy-agnostic orchestrator
///
/// Cheap to clone; clones share the pipeline and the immutable knowledge base.
#[derive(Clone)]
pub struct AnalysisEngine {
    pipeline: Arc<dyn ClassificationPipeline>,
}

impl AnalysisEngine {
    /// Engine running an already built pipeline
    pub fn new(pipeline: Arc<dyn ClassificationPipeline>) -> Self {
        Self { pipeline }
    }

    /// Engine running the given strategy against a generator
    pub fn with_strategy(
        strategy: PipelineStrategy,
        generator: Arc<dyn TextGenerator>,
        knowledge_base: Arc<KnowledgeBase>,
    ) -> Self {
        Self::new(build_pipeline(strategy, generator, knowledge_base))
    }

    /// Strategy every call on this engine uses
    pub fn strategy(&self) -> PipelineStrategy {
        self.pipeline.strategy()
    }

    /// Analyze one message
    ///
    /// Callers trim input and reject blank messages before calling. Every
    /// upstream failure is returned unchanged; nothing is retried.
    pub async fn analyze(&self, incident_text: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let request_id = Uuid::new_v4();
        let start_time = std::time::Instant::now();
        let strategy = self.pipeline.strategy();

        tracing::debug!(
            request_id = %request_id,
            strategy = %strategy,
            input_length = incident_text.len(),
            "Starting incident analysis"
        );

        match self.pipeline.classify(incident_text).await {
            Ok(outcome) => {
                tracing::info!(
                    request_id = %request_id,
                    strategy = %strategy,
                    outcome = outcome.kind(),
                    severity = ?outcome.severity(),
                    elapsed_ms = start_time.elapsed().as_millis(),
                    "Incident analysis completed"
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    strategy = %strategy,
                    error_kind = e.kind().as_str(),
                    error = %e,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    "Incident analysis failed"
                );
                Err(e)
            }
        }
    }

    /// Analyze one message unless `cancel` completes first
    ///
    /// On cancellation the in-flight generation request is dropped.
    pub async fn analyze_until<F>(
        &self,
        incident_text: &str,
        cancel: F,
    ) -> Result<AnalysisOutcome, AnalysisError>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                tracing::info!("Incident analysis cancelled by caller");
                Err(AnalysisError::Cancelled)
            }
            result = self.analyze(incident_text) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::model::{GenerationSettings, SeverityLevel};
    use crate::service::llm::{GeminiClient, GenerationError};

    const INCIDENT: &str = "Two artists are arguing loudly over a stall boundary and a crowd is forming.";

    /// Returns queued responses in order and records every prompt
    struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, GenerationError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String, GenerationError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn replying(payloads: &[&str]) -> Arc<Self> {
            Self::new(payloads.iter().map(|p| Ok(p.to_string())).collect())
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn prompt(&self, index: usize) -> String {
            self.prompts.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, instructions: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(instructions.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenerationError::EmptyPayload))
        }
    }

    /// Never answers
    struct HangingGenerator;

    #[async_trait]
    impl TextGenerator for HangingGenerator {
        async fn generate(&self, _instructions: &str) -> Result<String, GenerationError> {
            std::future::pending().await
        }
    }

    fn engine(strategy: PipelineStrategy, generator: Arc<ScriptedGenerator>) -> AnalysisEngine {
        AnalysisEngine::with_strategy(strategy, generator, Arc::new(KnowledgeBase::standard()))
    }

    #[tokio::test]
    async fn test_single_pass_general_reply() {
        let generator = ScriptedGenerator::replying(&[
            r#"{"isGeneralQuery": true, "message": "Hi! I help analyze incidents at Kala Pola."}"#,
        ]);
        let engine = engine(PipelineStrategy::SinglePass, generator.clone());

        let outcome = engine.analyze("Hello there").await.unwrap();

        assert_eq!(
            outcome,
            AnalysisOutcome::GeneralReply {
                message: "Hi! I help analyze incidents at Kala Pola.".to_string()
            }
        );
        assert_eq!(generator.calls(), 1);
        assert!(generator.prompt(0).ends_with("USER INPUT:\nHello there"));
    }

    #[tokio::test]
    async fn test_single_pass_incident() {
        let generator = ScriptedGenerator::replying(&[
            r#"{"isGeneralQuery": false, "likelihood": "Medium", "impact": "High", "message": "X"}"#,
        ]);
        let engine = engine(PipelineStrategy::SinglePass, generator.clone());

        let outcome = engine.analyze(INCIDENT).await.unwrap();

        assert_eq!(
            outcome,
            AnalysisOutcome::IncidentAssessment {
                likelihood: SeverityLevel::Medium,
                impact: SeverityLevel::High,
                message: "X".to_string(),
            }
        );
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_single_pass_infers_flag_from_likelihood() {
        let generator = ScriptedGenerator::replying(&[
            r#"{"likelihood": "low", "impact": "Low", "message": "Acknowledge once and move on."}"#,
        ]);
        let outcome = engine(PipelineStrategy::SinglePass, generator)
            .analyze(INCIDENT)
            .await
            .unwrap();
        assert!(!outcome.is_general_query());
        assert_eq!(outcome.severity(), Some((SeverityLevel::Low, SeverityLevel::Low)));
    }

    #[tokio::test]
    async fn test_fenced_payload_is_accepted() {
        let generator = ScriptedGenerator::replying(&[
            "```json\n{\"isGeneralQuery\": true, \"message\": \"Hello!\"}\n```",
        ]);
        let outcome = engine(PipelineStrategy::SinglePass, generator)
            .analyze("hi")
            .await
            .unwrap();
        assert_eq!(outcome.message(), "Hello!");
    }

    #[tokio::test]
    async fn test_unparsable_payload_is_parse_error() {
        let generator = ScriptedGenerator::replying(&["I think this is a medium incident."]);
        let result = engine(PipelineStrategy::SinglePass, generator)
            .analyze(INCIDENT)
            .await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[tokio::test]
    async fn test_rate_limit_propagates() {
        let generator = ScriptedGenerator::new(vec![Err(GenerationError::RateLimited)]);
        let err = engine(PipelineStrategy::SinglePass, generator.clone())
            .analyze(INCIDENT)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimitError);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_two_pass_short_circuits_general_queries() {
        let generator = ScriptedGenerator::replying(&[
            r#"{"isIncident": false, "message": "Hello! Tell me about any incident at Kala Pola."}"#,
            r#"{"likelihood": "High", "impact": "High", "message": "should never be requested"}"#,
        ]);
        let engine = engine(PipelineStrategy::TwoPass, generator.clone());

        let outcome = engine.analyze("What time does the fair open?").await.unwrap();

        assert_eq!(
            outcome,
            AnalysisOutcome::GeneralReply {
                message: "Hello! Tell me about any incident at Kala Pola.".to_string()
            }
        );
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_two_pass_incident_makes_second_call() {
        let generator = ScriptedGenerator::replying(&[
            r#"{"isIncident": true}"#,
            r#"{"likelihood": "Medium", "impact": "High", "message": "X"}"#,
        ]);
        let engine = engine(PipelineStrategy::TwoPass, generator.clone());

        let outcome = engine.analyze(INCIDENT).await.unwrap();

        assert_eq!(
            outcome,
            AnalysisOutcome::IncidentAssessment {
                likelihood: SeverityLevel::Medium,
                impact: SeverityLevel::High,
                message: "X".to_string(),
            }
        );
        assert_eq!(generator.calls(), 2);
        assert!(generator.prompt(0).contains("\"isIncident\": boolean"));
        assert!(generator.prompt(1).ends_with(INCIDENT));
    }

    #[tokio::test]
    async fn test_two_pass_unparsable_assessment_is_parse_error() {
        let generator = ScriptedGenerator::replying(&[r#"{"isIncident": true}"#, "not json"]);
        let err = engine(PipelineStrategy::TwoPass, generator.clone())
            .analyze(INCIDENT)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_two_pass_assessment_without_severity_is_not_a_general_reply() {
        let generator = ScriptedGenerator::replying(&[
            r#"{"isIncident": true}"#,
            r#"{"message": "Stay calm."}"#,
        ]);
        let err = engine(PipelineStrategy::TwoPass, generator)
            .analyze(INCIDENT)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[tokio::test]
    async fn test_two_pass_triage_failure_stops_pipeline() {
        let generator = ScriptedGenerator::replying(&[r#"{"message": "no decision"}"#]);
        let err = engine(PipelineStrategy::TwoPass, generator.clone())
            .analyze(INCIDENT)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_is_configuration_error() {
        let settings = GenerationSettings {
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = Arc::new(GeminiClient::new(&settings).unwrap());
        let engine = AnalysisEngine::with_strategy(
            PipelineStrategy::TwoPass,
            client,
            Arc::new(KnowledgeBase::standard()),
        );

        let err = engine.analyze(INCIDENT).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationError);
    }

    fn gemini_engine(settings: &GenerationSettings) -> AnalysisEngine {
        AnalysisEngine::with_strategy(
            PipelineStrategy::SinglePass,
            Arc::new(GeminiClient::new(settings).unwrap()),
            Arc::new(KnowledgeBase::standard()),
        )
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        let settings = GenerationSettings {
            api_key: Some("k".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };

        let err = gemini_engine(&settings).analyze(INCIDENT).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkError);
        assert!(err.user_message().contains("check your connection"));
    }

    #[tokio::test]
    async fn test_client_timeout_is_network_error() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let settings = GenerationSettings {
            api_key: Some("k".to_string()),
            base_url: format!("http://{}", addr),
            timeout: std::time::Duration::from_millis(50),
            ..Default::default()
        };

        let err = gemini_engine(&settings).analyze(INCIDENT).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkError);
        assert!(err.user_message().contains("check your connection"));

        server.abort();
    }

    #[tokio::test]
    async fn test_cancellation_returns_cancelled() {
        let engine = AnalysisEngine::with_strategy(
            PipelineStrategy::SinglePass,
            Arc::new(HangingGenerator),
            Arc::new(KnowledgeBase::standard()),
        );

        let err = engine
            .analyze_until(INCIDENT, std::future::ready(()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_that_never_fires_does_not_interfere() {
        let generator = ScriptedGenerator::replying(&[
            r#"{"isGeneralQuery": true, "message": "Hello!"}"#,
        ]);
        let outcome = engine(PipelineStrategy::SinglePass, generator)
            .analyze_until("hi", std::future::pending::<()>())
            .await
            .unwrap();
        assert!(outcome.is_general_query());
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let generator = ScriptedGenerator::replying(&[
            r#"{"isGeneralQuery": true, "message": "Hello!"}"#,
            r#"{"isGeneralQuery": true, "message": "Hello!"}"#,
        ]);
        let engine = engine(PipelineStrategy::SinglePass, generator.clone());
        let other = engine.clone();

        let (first, second) = tokio::join!(engine.analyze("hi"), other.analyze("hello"));

        assert!(first.unwrap().is_general_query());
        assert!(second.unwrap().is_general_query());
        assert_eq!(generator.calls(), 2);
    }
}

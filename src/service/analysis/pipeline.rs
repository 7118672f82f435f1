//! Classification strategies
//!
//! Both strategies sequence prompt building, one or two generation calls and
//! payload normalization. Neither retries nor falls back on failure.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::model::{
    AnalysisOutcome, ExtractedOutcome, ExtractedSeverity, ExtractedTriage, KnowledgeBase,
    PipelineStrategy,
};
use crate::service::analysis::AnalysisError;
use crate::service::analysis::converters::convert_outcome;
use crate::service::analysis::prompts::{
    build_assessment_prompt, build_single_pass_prompt, build_triage_prompt,
};
use crate::service::analysis::validation::{
    parse_payload, validate_extracted_outcome, validate_extracted_triage,
};
use crate::service::llm::TextGenerator;

/// A way of turning an incident description into an outcome
#[async_trait]
pub trait ClassificationPipeline: Send + Sync {
    fn strategy(&self) -> PipelineStrategy;

    async fn classify(&self, incident_text: &str) -> Result<AnalysisOutcome, AnalysisError>;
}

/// Build the pipeline for a configured strategy
pub fn build_pipeline(
    strategy: PipelineStrategy,
    generator: Arc<dyn TextGenerator>,
    knowledge_base: Arc<KnowledgeBase>,
) -> Arc<dyn ClassificationPipeline> {
    match strategy {
        PipelineStrategy::SinglePass => {
            Arc::new(SinglePassPipeline::new(generator, knowledge_base))
        }
        PipelineStrategy::TwoPass => Arc::new(TwoPassPipeline::new(generator, knowledge_base)),
    }
}

/// Classify and assess in one call
pub struct SinglePassPipeline {
    generator: Arc<dyn TextGenerator>,
    knowledge_base: Arc<KnowledgeBase>,
}

impl SinglePassPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, knowledge_base: Arc<KnowledgeBase>) -> Self {
        Self {
            generator,
            knowledge_base,
        }
    }
}

#[async_trait]
impl ClassificationPipeline for SinglePassPipeline {
    fn strategy(&self) -> PipelineStrategy {
        PipelineStrategy::SinglePass
    }

    async fn classify(&self, incident_text: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let prompt = build_single_pass_prompt(&self.knowledge_base, incident_text);
        let raw = generate_logged(self.generator.as_ref(), "single_pass", &prompt).await?;

        let extracted: ExtractedOutcome = parse_payload(&raw)?;
        validate_extracted_outcome(&extracted, &self.knowledge_base).into_result("single_pass")?;

        convert_outcome(extracted)
    }
}

/// Triage first; assess severity only for incidents
pub struct TwoPassPipeline {
    generator: Arc<dyn TextGenerator>,
    knowledge_base: Arc<KnowledgeBase>,
}

impl TwoPassPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, knowledge_base: Arc<KnowledgeBase>) -> Self {
        Self {
            generator,
            knowledge_base,
        }
    }

    async fn triage(&self, incident_text: &str) -> Result<ExtractedTriage, AnalysisError> {
        let prompt = build_triage_prompt(&self.knowledge_base, incident_text);
        let raw = generate_logged(self.generator.as_ref(), "triage", &prompt).await?;

        let triage: ExtractedTriage = parse_payload(&raw)?;
        validate_extracted_triage(&triage).into_result("triage")?;

        Ok(triage)
    }

    async fn assess(&self, incident_text: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let prompt = build_assessment_prompt(&self.knowledge_base, incident_text);
        let raw = generate_logged(self.generator.as_ref(), "assessment", &prompt).await?;

        let severity: ExtractedSeverity = parse_payload(&raw)?;

        // Triage already decided this is an incident
        let extracted = ExtractedOutcome {
            is_general_query: Some(false),
            ..ExtractedOutcome::from(severity)
        };
        validate_extracted_outcome(&extracted, &self.knowledge_base).into_result("assessment")?;

        convert_outcome(extracted)
    }
}

#[async_trait]
impl ClassificationPipeline for TwoPassPipeline {
    fn strategy(&self) -> PipelineStrategy {
        PipelineStrategy::TwoPass
    }

    async fn classify(&self, incident_text: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let triage = self.triage(incident_text).await?;

        if triage.is_incident == Some(false) {
            let message = triage.message.unwrap_or_default().trim().to_string();
            tracing::debug!("Triage found no incident, skipping assessment");
            return Ok(AnalysisOutcome::GeneralReply { message });
        }

        self.assess(incident_text).await
    }
}

/// One generation call with timing logs
async fn generate_logged(
    generator: &dyn TextGenerator,
    stage: &'static str,
    prompt: &str,
) -> Result<String, AnalysisError> {
    let start_time = Instant::now();
    let prompt_length = prompt.len();

    tracing::debug!(stage = stage, prompt_length = prompt_length, "Initiating generation call");

    match generator.generate(prompt).await {
        Ok(raw) => {
            tracing::info!(
                stage = stage,
                elapsed_ms = start_time.elapsed().as_millis(),
                prompt_length = prompt_length,
                response_length = raw.len(),
                "Generation call completed successfully"
            );
            Ok(raw)
        }
        Err(e) => {
            tracing::error!(
                stage = stage,
                elapsed_ms = start_time.elapsed().as_millis(),
                prompt_length = prompt_length,
                error = %e,
                "Generation call failed"
            );
            Err(e.into())
        }
    }
}

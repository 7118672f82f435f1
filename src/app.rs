//! Application state and service initialization
//!
//! Builds the knowledge base, generation client and configured pipeline into a
//! ready [`AnalysisEngine`].

use std::sync::Arc;

use url::Url;

use crate::model::{Config, KnowledgeBase};
use crate::service::{AnalysisEngine, GeminiClient};

/// Application state containing the engine and its shared reference data
pub struct AppState {
    /// Likelihood×Impact tables, shared read-only by every analysis
    pub knowledge_base: Arc<KnowledgeBase>,
    /// Incident analysis entry point
    pub engine: AnalysisEngine,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// A missing API key does not fail here; analysis calls report it instead.
    pub fn new(config: Config) -> Result<Self, AppError> {
        Url::parse(&config.generation.base_url)
            .map_err(|_| AppError::InvalidConfig("GEMINI_BASE_URL is not a valid URL"))?;

        let knowledge_base = Arc::new(KnowledgeBase::standard());

        let client = GeminiClient::new(&config.generation).map_err(AppError::ClientInit)?;

        let engine = AnalysisEngine::with_strategy(
            config.pipeline,
            Arc::new(client),
            Arc::clone(&knowledge_base),
        );

        tracing::info!(
            pipeline = %config.pipeline,
            model = %config.generation.model,
            "Incident advisor initialized"
        );

        Ok(Self {
            knowledge_base,
            engine,
        })
    }

    /// Initialize from the process environment and optional config file
    pub fn from_env() -> Result<Self, AppError> {
        Self::new(Config::from_env())
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Generation client could not be built
    #[error("Generation client initialization failed: {0}")]
    ClientInit(String),
}

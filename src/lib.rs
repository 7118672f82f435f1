//! Incident classification and response advisory engine
//!
//! Classifies free-text incident reports against the event's Likelihood×Impact
//! matrix and returns a single actionable instruction, using an external
//! text-generation service for the judgement and enforcing the output contract
//! locally.

pub mod app;
pub mod model;
pub mod service;

pub use app::{AppError, AppState};
pub use model::{
    AnalysisOutcome, Config, GuidelineCell, KnowledgeBase, PipelineStrategy, SeverityLevel,
};
pub use service::analysis::{AnalysisEngine, AnalysisError, ErrorKind};

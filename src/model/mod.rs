pub mod config;
pub mod gemini;
pub mod knowledge;
pub mod outcome;
pub mod severity;

pub use config::{Config, ConfigFile, GenerationSettings, PipelineStrategy};
pub use knowledge::{GuidelineCell, KnowledgeBase};
pub use outcome::{AnalysisOutcome, ExtractedOutcome, ExtractedSeverity, ExtractedTriage};
pub use severity::{ParseSeverityError, SeverityLevel};

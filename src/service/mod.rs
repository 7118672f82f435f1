pub mod analysis;
pub mod llm;

pub use analysis::AnalysisEngine;
pub use llm::{GeminiClient, TextGenerator};

//! Converters from extracted payloads to analysis outcomes

use crate::model::{AnalysisOutcome, ExtractedOutcome, SeverityLevel};
use crate::service::analysis::AnalysisError;

/// Decide whether a payload is a general reply
///
/// An explicit `isGeneralQuery` wins; without it, the payload is general if
/// and only if it carries no (non-blank) likelihood.
pub fn resolve_general_query(outcome: &ExtractedOutcome) -> bool {
    outcome.is_general_query.unwrap_or_else(|| {
        outcome
            .likelihood
            .as_deref()
            .is_none_or(|l| l.trim().is_empty())
    })
}

/// Convert a validated payload into an outcome
pub fn convert_outcome(extracted: ExtractedOutcome) -> Result<AnalysisOutcome, AnalysisError> {
    let is_general_query = resolve_general_query(&extracted);

    let message = extracted
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AnalysisError::Parse("message is missing or empty".to_string()))?;

    if is_general_query {
        return Ok(AnalysisOutcome::GeneralReply { message });
    }

    Ok(AnalysisOutcome::IncidentAssessment {
        likelihood: convert_level("likelihood", extracted.likelihood)?,
        impact: convert_level("impact", extracted.impact)?,
        message,
    })
}

fn convert_level(field: &str, value: Option<String>) -> Result<SeverityLevel, AnalysisError> {
    let value =
        value.ok_or_else(|| AnalysisError::Parse(format!("incident is missing {}", field)))?;
    value
        .parse()
        .map_err(|e| AnalysisError::Parse(format!("{}: {}", field, e)))
}

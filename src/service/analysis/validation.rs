//! Validation logic for generated classification payloads
//!
//! Everything the generation service returns is untrusted: payloads are
//! unwrapped, parsed as JSON objects, then checked against the outcome contract.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::model::{ExtractedOutcome, ExtractedTriage, KnowledgeBase, SeverityLevel};
use crate::service::analysis::AnalysisError;
use crate::service::analysis::converters::resolve_general_query;

/// Guideline fields shorter than this are too generic to count as quoting
const MIN_QUOTED_LENGTH: usize = 40;

static OPENING_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^```[ \t]*[A-Za-z]*[ \t]*\r?\n?").expect("opening fence pattern is valid")
});

static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n?```$").expect("closing fence pattern is valid"));

/// Result of payload validation
#[derive(Debug)]
pub struct OutcomeValidationResult {
    /// Whether the payload satisfies the contract
    pub is_valid: bool,
    /// Contract violations
    pub errors: Vec<String>,
    /// Quality issues that do not invalidate the payload
    pub warnings: Vec<String>,
}

impl OutcomeValidationResult {
    /// Start with no errors or warnings
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a contract violation and mark the payload invalid
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Record a quality issue without invalidating the payload
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Log warnings and turn errors into a parse failure
    pub fn into_result(self, stage: &str) -> Result<(), AnalysisError> {
        for warning in &self.warnings {
            tracing::warn!(stage = %stage, warning = %warning, "Generated payload warning");
        }

        if self.is_valid {
            Ok(())
        } else {
            tracing::warn!(
                stage = %stage,
                errors = ?self.errors,
                "Generated payload failed validation"
            );
            Err(AnalysisError::Parse(self.errors.join("; ")))
        }
    }
}

/// Remove a Markdown code fence wrapped around the payload
///
/// Applying this to already clean text returns it unchanged.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let opened = OPENING_FENCE.replace(trimmed, "");
    let closed = CLOSING_FENCE.replace(&opened, "");
    closed.trim().to_string()
}

/// Strip, parse and deserialize a payload that must be a single JSON object
pub fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<T, AnalysisError> {
    let cleaned = strip_code_fences(raw);

    let value: serde_json::Value = serde_json::from_str(&cleaned)
        .map_err(|e| AnalysisError::Parse(format!("payload is not valid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(AnalysisError::Parse(
            "payload is not a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| AnalysisError::Parse(format!("payload does not match contract: {}", e)))
}

/// Validate a classification payload against the outcome contract
///
/// Checks:
/// 1. A non-blank message is present
/// 2. Incidents carry both likelihood and impact, each Low, Medium or High
/// 3. General replies carry no severity (warning only)
/// 4. Incident messages do not quote guideline text verbatim (warning only)
pub fn validate_extracted_outcome(
    outcome: &ExtractedOutcome,
    knowledge_base: &KnowledgeBase,
) -> OutcomeValidationResult {
    let mut result = OutcomeValidationResult::valid();

    let message = outcome.message.as_deref().map(str::trim).unwrap_or_default();
    if message.is_empty() {
        result.add_error("message is missing or empty".to_string());
    }

    if resolve_general_query(outcome) {
        if outcome.likelihood.is_some() || outcome.impact.is_some() {
            result.add_warning(
                "general reply carries likelihood/impact, ignoring severity fields".to_string(),
            );
        }
        return result;
    }

    validate_level("likelihood", outcome.likelihood.as_deref(), &mut result);
    validate_level("impact", outcome.impact.as_deref(), &mut result);

    if let Some(cell) = quoted_guideline(message, knowledge_base) {
        result.add_warning(format!(
            "message quotes the {} guideline verbatim",
            cell
        ));
    }

    result
}

/// Validate a triage payload from the first stage of the two-pass pipeline
pub fn validate_extracted_triage(triage: &ExtractedTriage) -> OutcomeValidationResult {
    let mut result = OutcomeValidationResult::valid();

    match triage.is_incident {
        None => result.add_error("isIncident is missing".to_string()),
        Some(false) => {
            let message = triage.message.as_deref().map(str::trim).unwrap_or_default();
            if message.is_empty() {
                result.add_error("general reply message is missing or empty".to_string());
            }
        }
        Some(true) => {
            if triage.message.is_some() {
                result.add_warning("incident triage carries a message, ignoring it".to_string());
            }
        }
    }

    result
}

fn validate_level(field: &str, value: Option<&str>, result: &mut OutcomeValidationResult) {
    match value.map(str::trim) {
        None | Some("") => result.add_error(format!("incident is missing {}", field)),
        Some(level) => {
            if level.parse::<SeverityLevel>().is_err() {
                result.add_error(format!(
                    "{} '{}' is not one of Low, Medium, High",
                    field, level
                ));
            }
        }
    }
}

/// Name of the first cell whose guideline text appears inside the message
fn quoted_guideline(message: &str, knowledge_base: &KnowledgeBase) -> Option<String> {
    let message = message.to_lowercase();

    KnowledgeBase::cells().find_map(|(likelihood, impact)| {
        knowledge_base
            .guideline(likelihood, impact)
            .fields()
            .iter()
            .filter(|field| field.len() >= MIN_QUOTED_LENGTH)
            .any(|field| message.contains(&field.to_lowercase()))
            .then(|| format!("{}/{}", likelihood, impact))
    })
}

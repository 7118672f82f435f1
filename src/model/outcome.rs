use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};

use crate::model::SeverityLevel;

/// Result of analyzing one user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// The message was not an incident report
    GeneralReply { message: String },
    /// The message described an incident; `message` is the instruction to follow
    IncidentAssessment {
        likelihood: SeverityLevel,
        impact: SeverityLevel,
        message: String,
    },
}

impl AnalysisOutcome {
    pub fn is_general_query(&self) -> bool {
        matches!(self, AnalysisOutcome::GeneralReply { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            AnalysisOutcome::GeneralReply { message }
            | AnalysisOutcome::IncidentAssessment { message, .. } => message,
        }
    }

    /// `(likelihood, impact)` for incident assessments
    pub fn severity(&self) -> Option<(SeverityLevel, SeverityLevel)> {
        match self {
            AnalysisOutcome::GeneralReply { .. } => None,
            AnalysisOutcome::IncidentAssessment {
                likelihood, impact, ..
            } => Some((*likelihood, *impact)),
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisOutcome::GeneralReply { .. } => "general_reply",
            AnalysisOutcome::IncidentAssessment { .. } => "incident_assessment",
        }
    }
}

/// Caller-facing shape: `{isGeneralQuery, likelihood?, impact?, message}`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeRecord<'a> {
    is_general_query: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    likelihood: Option<SeverityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    impact: Option<SeverityLevel>,
    message: &'a str,
}

impl Serialize for AnalysisOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let severity = self.severity();
        OutcomeRecord {
            is_general_query: self.is_general_query(),
            likelihood: severity.map(|(l, _)| l),
            impact: severity.map(|(_, i)| i),
            message: self.message(),
        }
        .serialize(serializer)
    }
}

/// Classification payload returned by the generation service
///
/// Every field is optional: the service is not bound by a schema, so shape
/// problems are reported by validation instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Classification of the user's message and the reply to show")]
pub struct ExtractedOutcome {
    #[schemars(
        description = "true for greetings or informational questions, false when the message reports an incident"
    )]
    pub is_general_query: Option<bool>,

    #[schemars(description = "Low, Medium or High; only when the message reports an incident")]
    pub likelihood: Option<String>,

    #[schemars(description = "Low, Medium or High; only when the message reports an incident")]
    pub impact: Option<String>,

    #[schemars(
        description = "The reply: a friendly conversational answer, or one immediate actionable instruction of 2-4 sentences"
    )]
    pub message: Option<String>,
}

/// Incident/non-incident decision returned by the first stage of the two-pass pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Whether the user's message reports an incident")]
pub struct ExtractedTriage {
    #[schemars(description = "true when the message reports an incident")]
    pub is_incident: Option<bool>,

    #[schemars(
        description = "Friendly conversational reply when the message is not an incident; omit otherwise"
    )]
    pub message: Option<String>,
}

/// Severity assessment returned by the second stage of the two-pass pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Severity of a confirmed incident and the instruction to follow")]
pub struct ExtractedSeverity {
    #[schemars(description = "Low, Medium or High")]
    pub likelihood: Option<String>,

    #[schemars(description = "Low, Medium or High")]
    pub impact: Option<String>,

    #[schemars(description = "One immediate actionable instruction of 2-4 sentences")]
    pub message: Option<String>,
}

impl From<ExtractedSeverity> for ExtractedOutcome {
    /// Stage-B payloads carry no `isGeneralQuery` of their own
    fn from(severity: ExtractedSeverity) -> Self {
        Self {
            is_general_query: None,
            likelihood: severity.likelihood,
            impact: severity.impact,
            message: severity.message,
        }
    }
}

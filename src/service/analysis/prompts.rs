//! Prompts for incident analysis

use schemars::JsonSchema;

use crate::model::{ExtractedOutcome, ExtractedSeverity, ExtractedTriage, KnowledgeBase};

/// Role and ground rules shared by every stage
pub const ADVISOR_PREAMBLE: &str = r#"You are a Kala Pola assistant and incident advisor.

Kala Pola is a recurring open-air art fair. Volunteers, supervisors and event
leadership use you to decide how to respond to incidents reported on the ground.

You must:
- Treat the user input as a description written by event staff
- Use the reference tables only to ground your judgement
- Keep advice immediate, flexible and actionable

Do not:
- Quote the reference tables verbatim
- Invent contacts, names or procedures not implied by the references
- Return anything other than a single JSON object"#;

const USER_INPUT_HEADER: &str = "USER INPUT:";

/// Single call: classify, assess and answer
pub fn build_single_pass_prompt(knowledge_base: &KnowledgeBase, incident_text: &str) -> String {
    format!(
        r#"{preamble}

TASK:
1. Determine if the user's message is an incident (complaints, conflicts, safety, operational issues) or a general query (greetings, info).
2. If it's a GENERAL QUERY: Return a friendly, helpful conversational message. Mention you help analyze incidents at Kala Pola.
3. If it's an INCIDENT:
   - Assess likelihood and impact (Low/Medium/High) using the reference tables below as grounding only.
   - Provide ONE IMMEDIATE, FLEXIBLE, and ACTIONABLE message (2-4 sentences) telling them exactly what to do.
   - Synthesize the message in your own words; do not copy guideline text.

{references}

RETURN JSON FORMAT:
{{
  "isGeneralQuery": boolean,
  "likelihood": "Low/Medium/High" (only if incident),
  "impact": "Low/Medium/High" (only if incident),
  "message": "The final response message (general or incident-specific)"
}}

{schema}

{user_input}"#,
        preamble = ADVISOR_PREAMBLE,
        references = references_section(knowledge_base, true),
        schema = schema_section::<ExtractedOutcome>(),
        user_input = user_input_section(incident_text),
    )
}

/// Stage A of the two-pass pipeline: incident or not
pub fn build_triage_prompt(knowledge_base: &KnowledgeBase, incident_text: &str) -> String {
    format!(
        r#"{preamble}

TASK:
Decide whether the user's message reports an incident (complaints, conflicts, safety, operational issues) or is a general query (greetings, info).
- If it is an INCIDENT: set "isIncident" to true and omit "message". Do not assess severity yet.
- If it is a GENERAL QUERY: set "isIncident" to false and write a friendly, helpful conversational "message". Mention you help analyze incidents at Kala Pola.

{references}

RETURN JSON FORMAT:
{{
  "isIncident": boolean,
  "message": "Friendly reply" (only if not an incident)
}}

{schema}

{user_input}"#,
        preamble = ADVISOR_PREAMBLE,
        references = references_section(knowledge_base, false),
        schema = schema_section::<ExtractedTriage>(),
        user_input = user_input_section(incident_text),
    )
}

/// Stage B of the two-pass pipeline: severity and instruction for a confirmed incident
pub fn build_assessment_prompt(knowledge_base: &KnowledgeBase, incident_text: &str) -> String {
    format!(
        r#"{preamble}

The user's message has been confirmed as an INCIDENT.

TASK:
1. Assess likelihood and impact (Low/Medium/High) using the reference tables below as grounding only.
2. Provide ONE IMMEDIATE, FLEXIBLE, and ACTIONABLE message (2-4 sentences) telling them exactly what to do.
3. Synthesize the message in your own words from the matching guideline; do not copy guideline text.

{references}

RETURN JSON FORMAT:
{{
  "likelihood": "Low/Medium/High",
  "impact": "Low/Medium/High",
  "message": "The incident-specific instruction"
}}

{schema}

{user_input}"#,
        preamble = ADVISOR_PREAMBLE,
        references = references_section(knowledge_base, true),
        schema = schema_section::<ExtractedSeverity>(),
        user_input = user_input_section(incident_text),
    )
}

fn references_section(knowledge_base: &KnowledgeBase, include_guidelines: bool) -> String {
    let mut section = format!(
        "REFERENCE (Internal only):\nTable 1 (Likelihood/Impact): {}",
        knowledge_base.scenario_table_json()
    );
    if include_guidelines {
        section.push_str(&format!(
            "\nTable 2 (Response Guidelines): {}",
            knowledge_base.guideline_table_json()
        ));
    }
    section
}

fn schema_section<T: JsonSchema>() -> String {
    let schema = schemars::schema_for!(T);
    // Infallible: a schemars schema is already a JSON value
    let schema = serde_json::to_string(&schema).expect("generated schema is valid JSON");
    format!("The JSON object must conform to this schema:\n{}", schema)
}

/// Incident text goes last and unmodified
fn user_input_section(incident_text: &str) -> String {
    format!("{}\n{}", USER_INPUT_HEADER, incident_text)
}

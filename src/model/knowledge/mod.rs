//! Static Likelihood×Impact knowledge base
//!
//! Two dense 3×3 tables: example scenarios and response guidelines. Built once
//! at startup and shared read-only by every analysis.

mod tables;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::model::SeverityLevel;

/// Response guideline for one severity cell
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidelineCell {
    /// What the response is trying to achieve
    pub objective: String,
    /// Action for staff physically present
    pub on_ground: String,
    /// Social media and communications action
    pub digital: String,
    /// Who owns the response and who gets escalated to
    pub authority: String,
}

impl GuidelineCell {
    /// Fields in serialization order
    pub fn fields(&self) -> [&str; 4] {
        [
            self.objective.as_str(),
            self.on_ground.as_str(),
            self.digital.as_str(),
            self.authority.as_str(),
        ]
    }
}

/// Immutable scenario and guideline tables covering every (Likelihood, Impact) pair
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    scenarios: [[Vec<String>; 3]; 3],
    guidelines: [[GuidelineCell; 3]; 3],
}

impl KnowledgeBase {
    /// Build the Kala Pola reference tables
    pub fn standard() -> Self {
        let scenarios: [[Vec<String>; 3]; 3] = tables::SCENARIOS
            .map(|row| row.map(|cell| cell.iter().map(|s| s.to_string()).collect()));

        let guidelines = tables::GUIDELINES.map(|row| {
            row.map(|g| GuidelineCell {
                objective: g.objective.to_string(),
                on_ground: g.on_ground.to_string(),
                digital: g.digital.to_string(),
                authority: g.authority.to_string(),
            })
        });

        Self {
            scenarios,
            guidelines,
        }
    }

    /// Response guideline for a cell
    pub fn guideline(&self, likelihood: SeverityLevel, impact: SeverityLevel) -> &GuidelineCell {
        &self.guidelines[likelihood.index()][impact.index()]
    }

    /// Example scenarios for a cell
    pub fn scenarios(&self, likelihood: SeverityLevel, impact: SeverityLevel) -> &[String] {
        &self.scenarios[likelihood.index()][impact.index()]
    }

    /// All nine (likelihood, impact) cells in table order
    pub fn cells() -> impl Iterator<Item = (SeverityLevel, SeverityLevel)> {
        SeverityLevel::ALL
            .into_iter()
            .flat_map(|l| SeverityLevel::ALL.into_iter().map(move |i| (l, i)))
    }

    /// JSON rendering of the scenario table, `{likelihood: {impact: [..]}}`
    pub fn scenario_table_json(&self) -> String {
        // Infallible: string map keys and string or sequence values only
        serde_json::to_string(&ScenarioTableView(self))
            .expect("scenario table has string keys and values")
    }

    /// JSON rendering of the guideline table, `{likelihood: {impact: {..}}}`
    pub fn guideline_table_json(&self) -> String {
        // Infallible: string map keys and string struct fields only
        serde_json::to_string(&GuidelineTableView(self))
            .expect("guideline table has string keys and values")
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::standard()
    }
}

struct ScenarioTableView<'a>(&'a KnowledgeBase);
struct ScenarioRowView<'a>(&'a KnowledgeBase, SeverityLevel);
struct GuidelineTableView<'a>(&'a KnowledgeBase);
struct GuidelineRowView<'a>(&'a KnowledgeBase, SeverityLevel);

impl Serialize for ScenarioTableView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SeverityLevel::ALL.len()))?;
        for likelihood in SeverityLevel::ALL {
            map.serialize_entry(likelihood.as_str(), &ScenarioRowView(self.0, likelihood))?;
        }
        map.end()
    }
}

impl Serialize for ScenarioRowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SeverityLevel::ALL.len()))?;
        for impact in SeverityLevel::ALL {
            map.serialize_entry(impact.as_str(), self.0.scenarios(self.1, impact))?;
        }
        map.end()
    }
}

impl Serialize for GuidelineTableView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SeverityLevel::ALL.len()))?;
        for likelihood in SeverityLevel::ALL {
            map.serialize_entry(likelihood.as_str(), &GuidelineRowView(self.0, likelihood))?;
        }
        map.end()
    }
}

impl Serialize for GuidelineRowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SeverityLevel::ALL.len()))?;
        for impact in SeverityLevel::ALL {
            map.serialize_entry(impact.as_str(), self.0.guideline(self.1, impact))?;
        }
        map.end()
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One step on either severity axis (Likelihood or Impact)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
}

impl SeverityLevel {
    /// All levels in table order
    pub const ALL: [SeverityLevel; 3] = [
        SeverityLevel::Low,
        SeverityLevel::Medium,
        SeverityLevel::High,
    ];

    /// Canonical label used in tables and payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Low => "Low",
            SeverityLevel::Medium => "Medium",
            SeverityLevel::High => "High",
        }
    }

    /// Row/column position inside the 3×3 tables
    pub(crate) fn index(&self) -> usize {
        match self {
            SeverityLevel::Low => 0,
            SeverityLevel::Medium => 1,
            SeverityLevel::High => 2,
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized severity level: '{0}'")]
pub struct ParseSeverityError(pub String);

impl FromStr for SeverityLevel {
    type Err = ParseSeverityError;

    /// Accepts the level names case-insensitively, ignoring surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(SeverityLevel::Low),
            "medium" => Ok(SeverityLevel::Medium),
            "high" => Ok(SeverityLevel::High),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

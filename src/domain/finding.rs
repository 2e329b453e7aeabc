use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a finding, ordered from least to most severe.
///
/// Every agent maps whatever its upstream source reports onto this enum;
/// unknown or missing severities resolve to `Medium`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Maps a numeric CVSS base score onto the severity scale.
    ///
    /// Bands follow the CVSS v3 qualitative rating: below 4.0 is `Low`,
    /// below 7.0 `Medium`, below 9.0 `High`, everything else `Critical`.
    pub fn from_cvss_score(score: f64) -> Self {
        if score < 4.0 {
            Severity::Low
        } else if score < 7.0 {
            Severity::Medium
        } else if score < 9.0 {
            Severity::High
        } else {
            Severity::Critical
        }
    }

    /// Maps a textual severity label (any case) onto the scale.
    /// Unrecognized labels resolve to `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label.to_uppercase().as_str() {
            "CRITICAL" => Severity::Critical,
            "HIGH" => Severity::High,
            "MEDIUM" => Severity::Medium,
            "LOW" => Severity::Low,
            _ => Severity::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single issue or observation produced by one agent about one SBOM.
///
/// Findings carry no stable identity; they are positional within an
/// analysis response and are never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Name of the agent that produced this finding.
    pub agent_name: String,
    /// Human-readable description of the issue.
    pub finding: String,
    pub severity: Severity,
}

impl Finding {
    pub fn new(agent_name: impl Into<String>, finding: impl Into<String>, severity: Severity) -> Self {
        Self {
            agent_name: agent_name.into(),
            finding: finding.into(),
            severity,
        }
    }
}

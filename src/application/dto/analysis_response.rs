use crate::domain::{Finding, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated counts over one analysis run.
///
/// `findings_by_severity` omits severities with a zero count entirely;
/// `agents_run` lists every agent the orchestrator attempted, in its fixed
/// enumeration order, whether or not the agent produced findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_findings: usize,
    pub findings_by_severity: BTreeMap<Severity, usize>,
    pub agents_run: Vec<String>,
}

/// The complete result of analyzing one stored SBOM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub sbom_id: String,
    pub results: Vec<Finding>,
    pub summary: AnalysisSummary,
}

impl AnalysisResponse {
    /// Builds a response from collected findings, deriving the summary.
    pub fn new(sbom_id: impl Into<String>, results: Vec<Finding>, agents_run: Vec<String>) -> Self {
        let mut findings_by_severity = BTreeMap::new();
        for finding in &results {
            *findings_by_severity.entry(finding.severity).or_insert(0) += 1;
        }

        let summary = AnalysisSummary {
            total_findings: results.len(),
            findings_by_severity,
            agents_run,
        };

        Self {
            sbom_id: sbom_id.into(),
            results,
            summary,
        }
    }
}

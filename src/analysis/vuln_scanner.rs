use crate::analysis::{AgentError, AgentOutcome, AnalysisAgent};
use crate::domain::{Component, Finding, Sbom, Severity};
use crate::ports::outbound::{UpstreamError, VulnerabilityDatabase, VulnerabilityRecord};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Upper bound on concurrent per-component database queries.
const MAX_CONCURRENT_QUERIES: usize = 8;

/// External vulnerability agent backed by an OSV-style database.
///
/// Queries the database once per identifiable component and emits one
/// finding per returned vulnerability. Components the database cannot be
/// asked about (missing name, version, or ecosystem) are skipped without
/// an error, as are per-component query failures.
pub struct VulnerabilityScanner<V: VulnerabilityDatabase> {
    database: Arc<V>,
}

impl<V: VulnerabilityDatabase> VulnerabilityScanner<V> {
    pub fn new(database: Arc<V>) -> Self {
        Self { database }
    }

    async fn scan_component(
        &self,
        cancel: &CancellationToken,
        component: &Component,
    ) -> Result<Vec<Finding>, AgentError> {
        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        if !component.is_identifiable() {
            return Ok(Vec::new());
        }

        let Some(ecosystem) = ecosystem_for(component) else {
            return Ok(Vec::new());
        };

        let records = match self
            .database
            .query(cancel, &ecosystem, &component.name, &component.version)
            .await
        {
            Ok(records) => records,
            Err(UpstreamError::Cancelled) => return Err(AgentError::Cancelled),
            Err(err) => {
                warn!(component = %component.name, error = %err, "vulnerability query failed");
                return Ok(Vec::new());
            }
        };

        Ok(records
            .iter()
            .map(|record| {
                Finding::new(
                    self.name(),
                    describe_vulnerability(component, record),
                    severity_of(record),
                )
            })
            .collect())
    }
}

#[async_trait]
impl<V: VulnerabilityDatabase> AnalysisAgent for VulnerabilityScanner<V> {
    fn name(&self) -> &'static str {
        "Vulnerability Scanner"
    }

    async fn analyze(&self, cancel: &CancellationToken, sbom: &Sbom) -> AgentOutcome {
        // Bounded fan-out: up to MAX_CONCURRENT_QUERIES in flight, with
        // results yielded in component order.
        let pending_scans = sbom
            .components
            .iter()
            .map(|component| self.scan_component(cancel, component))
            .collect::<Vec<_>>();
        let mut scans = stream::iter(pending_scans).buffered(MAX_CONCURRENT_QUERIES);

        let mut findings = Vec::new();
        while let Some(result) = scans.next().await {
            match result {
                Ok(component_findings) => findings.extend(component_findings),
                Err(error) => return AgentOutcome::interrupted(findings, error),
            }
        }

        AgentOutcome::ok(findings)
    }
}

/// Derives the database's ecosystem name for a component.
///
/// Prefers the purl type; without a purl, the only recognizable shape is a
/// scoped npm name (`@scope/name`). Unknown ecosystems return `None` and
/// the component is skipped.
fn ecosystem_for(component: &Component) -> Option<String> {
    if let Some(rest) = component.purl.strip_prefix("pkg:") {
        let purl_type = rest.split('/').next()?.to_lowercase();
        return normalize_ecosystem(&purl_type).map(str::to_string);
    }

    if component.name.starts_with('@') && component.name.contains('/') {
        return Some("npm".to_string());
    }

    None
}

/// Maps a purl type onto the vulnerability database's ecosystem vocabulary.
fn normalize_ecosystem(purl_type: &str) -> Option<&'static str> {
    match purl_type {
        "npm" => Some("npm"),
        "pypi" => Some("PyPI"),
        "maven" => Some("Maven"),
        "cargo" => Some("crates.io"),
        "golang" | "go" => Some("Go"),
        "nuget" => Some("NuGet"),
        "composer" => Some("Packagist"),
        "gem" | "rubygems" => Some("RubyGems"),
        _ => None,
    }
}

/// Severity of a record: the first CVSS vector that yields a base score
/// decides; records without a usable score default to `Medium`.
fn severity_of(record: &VulnerabilityRecord) -> Severity {
    record
        .cvss_vectors
        .iter()
        .find_map(|vector| cvss_base_score(vector))
        .map(Severity::from_cvss_score)
        .unwrap_or(Severity::Medium)
}

/// Formats the finding text for one vulnerability.
fn describe_vulnerability(component: &Component, record: &VulnerabilityRecord) -> String {
    let mut text = format!(
        "{} {} is affected by {}",
        component.name, component.version, record.id
    );
    if !record.aliases.is_empty() {
        text.push_str(&format!(" [{}]", record.aliases.join(",")));
    }
    if let Some(summary) = record.summary.as_deref().filter(|s| !s.is_empty()) {
        text.push_str(&format!(": {summary}"));
    }
    text
}

/// Computes the CVSS v3 base score from a vector string such as
/// `CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H`.
///
/// Follows the v3.1 base score formula over the eight base metrics;
/// returns `None` for anything that is not a complete v3 vector.
fn cvss_base_score(vector: &str) -> Option<f64> {
    if !vector.starts_with("CVSS:3") {
        return None;
    }

    let metrics: HashMap<&str, &str> = vector
        .split('/')
        .skip(1) // Skip the "CVSS:3.x" prefix
        .filter_map(|part| {
            let mut split = part.split(':');
            Some((split.next()?, split.next()?))
        })
        .collect();

    let av = match *metrics.get("AV")? {
        "N" => 0.85,
        "A" => 0.62,
        "L" => 0.55,
        "P" => 0.2,
        _ => return None,
    };

    let ac = match *metrics.get("AC")? {
        "L" => 0.77,
        "H" => 0.44,
        _ => return None,
    };

    let scope = *metrics.get("S")?;
    let pr = match (*metrics.get("PR")?, scope) {
        ("N", _) => 0.85,
        ("L", "U") => 0.62,
        ("L", "C") => 0.68,
        ("H", "U") => 0.27,
        ("H", "C") => 0.5,
        _ => return None,
    };

    let ui = match *metrics.get("UI")? {
        "N" => 0.85,
        "R" => 0.62,
        _ => return None,
    };

    let impact_metric = |value: &str| -> Option<f64> {
        match value {
            "N" => Some(0.0),
            "L" => Some(0.22),
            "H" => Some(0.56),
            _ => None,
        }
    };
    let c = impact_metric(metrics.get("C")?)?;
    let i = impact_metric(metrics.get("I")?)?;
    let a = impact_metric(metrics.get("A")?)?;

    let iss = 1.0 - ((1.0 - c) * (1.0 - i) * (1.0 - a));
    let impact = if scope == "U" {
        6.42 * iss
    } else {
        7.52 * (iss - 0.029) - 3.25 * (iss - 0.02_f64).powi(15)
    };
    let exploitability = 8.22 * av * ac * pr * ui;

    let base_score = if impact <= 0.0 {
        0.0
    } else if scope == "U" {
        f64::min(impact + exploitability, 10.0)
    } else {
        f64::min(1.08 * (impact + exploitability), 10.0)
    };

    // Round up to one decimal place, as the CVSS specification requires.
    Some((base_score * 10.0).ceil() / 10.0)
}

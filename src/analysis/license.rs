use crate::analysis::{AgentError, AgentOutcome, AnalysisAgent};
use crate::domain::{Finding, Sbom, Severity};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Version tokens recognized when matching shortened license forms.
const VERSION_TOKENS: [&str; 5] = ["1.0", "1.1", "2.0", "2.1", "3.0"];

/// Deterministic license compliance agent.
///
/// Flags components carrying copyleft licenses that may impose
/// source-disclosure or reciprocity obligations. Purely CPU-bound; its
/// output is a deterministic function of the SBOM's components.
pub struct LicenseAgent {
    watchlist: Vec<(&'static str, &'static str)>,
}

impl LicenseAgent {
    pub fn new() -> Self {
        // High-risk copyleft licenses and their descriptions, keyed by
        // SPDX identifier.
        let watchlist = vec![
            ("AGPL-3.0-only", "GNU Affero General Public License v3.0 only"),
            ("AGPL-3.0-or-later", "GNU Affero General Public License v3.0 or later"),
            ("GPL-2.0-only", "GNU General Public License v2.0 only"),
            ("GPL-2.0-or-later", "GNU General Public License v2.0 or later"),
            ("GPL-3.0-only", "GNU General Public License v3.0 only"),
            ("GPL-3.0-or-later", "GNU General Public License v3.0 or later"),
            ("LGPL-2.1-only", "GNU Lesser General Public License v2.1 only"),
            ("LGPL-2.1-or-later", "GNU Lesser General Public License v2.1 or later"),
            ("LGPL-3.0-only", "GNU Lesser General Public License v3.0 only"),
            ("LGPL-3.0-or-later", "GNU Lesser General Public License v3.0 or later"),
            ("EUPL-1.1", "European Union Public License 1.1"),
            ("EUPL-1.2", "European Union Public License 1.2"),
            ("CDDL-1.0", "Common Development and Distribution License 1.0"),
            ("CDDL-1.1", "Common Development and Distribution License 1.1"),
            ("EPL-1.0", "Eclipse Public License 1.0"),
            ("EPL-2.0", "Eclipse Public License 2.0"),
            ("MPL-1.1", "Mozilla Public License 1.1"),
            ("MPL-2.0", "Mozilla Public License 2.0"),
            ("OSL-3.0", "Open Software License 3.0"),
            ("QPL-1.0", "Q Public License 1.0"),
            ("Sleepycat", "Sleepycat License"),
        ];

        Self { watchlist }
    }

    /// Checks whether a license identifier is on the high-risk watchlist,
    /// returning its description on a hit.
    ///
    /// Exact (case-insensitive) matches are tried first; shortened family
    /// forms like `GPL-3.0` then match watchlist entries sharing the same
    /// family prefix and version token.
    fn high_risk_description(&self, license: &str) -> Option<&'static str> {
        let candidate = license.trim().to_lowercase();

        for (identifier, description) in &self.watchlist {
            let entry = identifier.to_lowercase();
            if entry == candidate {
                return Some(description);
            }

            for family in ["agpl", "gpl", "lgpl"] {
                if family_matches(&candidate, family)
                    && family_matches(&entry, family)
                    && version_token(&candidate) == version_token(&entry)
                {
                    return Some(description);
                }
            }
        }

        None
    }

    /// Assigns severity by license family: network copyleft (AGPL) is the
    /// highest risk, strong copyleft (GPL) next, weak copyleft after that.
    fn determine_severity(license: &str) -> Severity {
        let license = license.to_lowercase();

        if license.contains("agpl") {
            return Severity::Critical;
        }
        if license.contains("gpl") && !license.contains("lgpl") {
            return Severity::High;
        }
        if ["lgpl", "mpl", "epl", "eupl", "cddl"]
            .iter()
            .any(|family| license.contains(family))
        {
            return Severity::Medium;
        }

        Severity::High
    }
}

impl Default for LicenseAgent {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the license string belongs to the given family. `gpl` must not
/// absorb `lgpl` strings, which form their own family.
fn family_matches(license: &str, family: &str) -> bool {
    match family {
        "gpl" => license.contains("gpl") && !license.contains("lgpl") && !license.contains("agpl"),
        other => license.contains(other),
    }
}

/// Extracts the first recognized version token from a license string.
fn version_token(license: &str) -> Option<&'static str> {
    VERSION_TOKENS
        .iter()
        .find(|token| license.contains(*token))
        .copied()
}

#[async_trait]
impl AnalysisAgent for LicenseAgent {
    fn name(&self) -> &'static str {
        "License Agent"
    }

    async fn analyze(&self, cancel: &CancellationToken, sbom: &Sbom) -> AgentOutcome {
        let mut findings = Vec::new();

        for component in &sbom.components {
            if cancel.is_cancelled() {
                return AgentOutcome::interrupted(findings, AgentError::Cancelled);
            }

            if component.license.is_empty() {
                continue;
            }

            if let Some(description) = self.high_risk_description(&component.license) {
                let severity = Self::determine_severity(&component.license);
                let finding = format!(
                    "Component '{}' (v{}) uses high-risk copyleft license '{}' ({}). \
                     This may require source code disclosure or impose other compliance obligations.",
                    component.name, component.version, component.license, description
                );
                findings.push(Finding::new(self.name(), finding, severity));
            }
        }

        AgentOutcome::ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Component;

    fn sbom_with(components: Vec<Component>) -> Sbom {
        let mut sbom = Sbom::new("urn:uuid:test", "test");
        sbom.components = components;
        sbom
    }

    async fn analyze(components: Vec<Component>) -> Vec<Finding> {
        let outcome = LicenseAgent::new()
            .analyze(&CancellationToken::new(), &sbom_with(components))
            .await;
        assert!(outcome.error.is_none());
        outcome.findings
    }

    #[tokio::test]
    async fn test_flags_exact_watchlist_matches() {
        let findings = analyze(vec![
            Component::new("express", "4.18.2", "", "MIT"),
            Component::new("copyleft-lib", "2.1.0", "", "GPL-3.0-only"),
            Component::new("agpl-lib", "1.0.0", "", "AGPL-3.0-only"),
        ])
        .await;

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::High);
        assert!(findings[0].finding.contains("copyleft-lib"));
        assert!(findings[0].finding.contains("GNU General Public License v3.0 only"));
        assert_eq!(findings[1].severity, Severity::Critical);
        assert!(findings[1].finding.contains("agpl-lib"));
    }

    #[tokio::test]
    async fn test_matches_shortened_gpl_form() {
        let findings =
            analyze(vec![Component::new("legacy", "1.0.0", "", "GPL-3.0")]).await;

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[tokio::test]
    async fn test_matching_is_case_insensitive_and_trims() {
        let findings = analyze(vec![
            Component::new("a", "1.0.0", "", "  gpl-2.0-only "),
            Component::new("b", "1.0.0", "", "MPL-2.0"),
        ])
        .await;

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[1].severity, Severity::Medium);
    }

    #[tokio::test]
    async fn test_lgpl_does_not_match_gpl_family() {
        // LGPL-2.1 must match the lgpl entries at Medium, never the GPL
        // entries at High.
        let findings = analyze(vec![Component::new("lib", "1.0.0", "", "LGPL-2.1")]).await;

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[tokio::test]
    async fn test_weak_copyleft_families_are_medium() {
        for license in ["LGPL-3.0-only", "MPL-1.1", "EPL-2.0", "EUPL-1.2", "CDDL-1.0"] {
            let findings = analyze(vec![Component::new("lib", "1.0.0", "", license)]).await;
            assert_eq!(findings.len(), 1, "license {license} should be flagged");
            assert_eq!(findings[0].severity, Severity::Medium, "license {license}");
        }
    }

    #[tokio::test]
    async fn test_other_watchlist_hits_are_high() {
        for license in ["OSL-3.0", "QPL-1.0", "Sleepycat"] {
            let findings = analyze(vec![Component::new("lib", "1.0.0", "", license)]).await;
            assert_eq!(findings.len(), 1, "license {license} should be flagged");
            assert_eq!(findings[0].severity, Severity::High, "license {license}");
        }
    }

    #[tokio::test]
    async fn test_skips_components_without_license() {
        let findings = analyze(vec![
            Component::new("anonymous", "1.0.0", "", ""),
            Component::new("permissive", "2.0.0", "", "Apache-2.0"),
        ])
        .await;

        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn test_unrelated_version_token_does_not_match() {
        // GPL-1.0 shares the family but no watchlist entry carries the
        // 1.0 token in the gpl family.
        let findings = analyze(vec![Component::new("ancient", "0.1.0", "", "GPL-1.0")]).await;
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn test_output_is_deterministic() {
        let components = vec![
            Component::new("a", "1.0.0", "", "GPL-3.0-only"),
            Component::new("b", "2.0.0", "", "AGPL-3.0-or-later"),
            Component::new("c", "3.0.0", "", "MPL-2.0"),
        ];

        let first = analyze(components.clone()).await;
        let second = analyze(components).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_finding_text_shape() {
        let findings =
            analyze(vec![Component::new("copyleft-lib", "2.1.0", "", "GPL-3.0-only")]).await;

        assert_eq!(
            findings[0].finding,
            "Component 'copyleft-lib' (v2.1.0) uses high-risk copyleft license 'GPL-3.0-only' \
             (GNU General Public License v3.0 only). This may require source code disclosure \
             or impose other compliance obligations."
        );
    }

    #[tokio::test]
    async fn test_cancellation_returns_partial_findings() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = LicenseAgent::new()
            .analyze(
                &cancel,
                &sbom_with(vec![Component::new("a", "1.0.0", "", "GPL-3.0-only")]),
            )
            .await;

        assert!(outcome.is_cancelled());
        assert!(outcome.findings.is_empty());
    }
}

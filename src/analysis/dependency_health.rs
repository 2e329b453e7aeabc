use crate::analysis::{AgentError, AgentOutcome, AnalysisAgent};
use crate::domain::{Component, Finding, Sbom, Severity};
use crate::ports::outbound::{LlmClient, UpstreamError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Reply substrings that indicate a component is at risk.
const RISK_KEYWORDS: [&str; 20] = [
    "unmaintained",
    "deprecated",
    "risky",
    "outdated",
    "abandoned",
    "not maintained",
    "no longer maintained",
    "inactive",
    "archived",
    "obsolete",
    "discontinued",
    "end of life",
    "eol",
    "unsupported",
    "vulnerable",
    "security issues",
    "not recommended",
    "avoid",
    "stale",
    "dead project",
];

/// LLM-backed dependency health agent.
///
/// Asks the local LLM a targeted one-sentence question about each
/// component's maintenance status and flags replies containing risk
/// indicators. A failing LLM call skips that component; only cancellation
/// interrupts the run.
pub struct DependencyHealthAgent<L: LlmClient> {
    llm: Arc<L>,
}

impl<L: LlmClient> DependencyHealthAgent<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self { llm }
    }

    fn health_prompt(component: &Component) -> String {
        format!(
            "Analyze the project health of the open-source component '{}' version '{}'. \
             Based on public knowledge, is this project actively maintained, deprecated, \
             or considered risky for other reasons? Answer in one sentence.",
            component.name, component.version
        )
    }

    fn indicates_risk(response: &str) -> bool {
        let response = response.to_lowercase();
        RISK_KEYWORDS
            .iter()
            .any(|keyword| response.contains(keyword))
    }
}

#[async_trait]
impl<L: LlmClient> AnalysisAgent for DependencyHealthAgent<L> {
    fn name(&self) -> &'static str {
        "Dependency Health Agent"
    }

    async fn analyze(&self, cancel: &CancellationToken, sbom: &Sbom) -> AgentOutcome {
        let mut findings = Vec::new();

        for component in &sbom.components {
            if cancel.is_cancelled() {
                return AgentOutcome::interrupted(findings, AgentError::Cancelled);
            }

            if !component.is_identifiable() {
                continue;
            }

            let prompt = Self::health_prompt(component);
            let response = match self.llm.generate(cancel, &prompt).await {
                Ok(response) => response,
                Err(UpstreamError::Cancelled) => {
                    return AgentOutcome::interrupted(findings, AgentError::Cancelled);
                }
                Err(err) => {
                    warn!(component = %component.name, error = %err, "dependency health query failed");
                    continue;
                }
            };

            let response = response.trim();
            if Self::indicates_risk(response) {
                findings.push(Finding::new(self.name(), response, Severity::Medium));
            }
        }

        AgentOutcome::ok(findings)
    }
}

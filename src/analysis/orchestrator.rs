use crate::analysis::{
    AgentError, AgentOutcome, AnalysisAgent, DependencyHealthAgent, LicenseAgent,
    ProactiveVulnerabilityAgent, VulnerabilityScanner,
};
use crate::application::dto::{AgentSelection, AnalysisResponse};
use crate::ports::inbound::{AnalysisError, AnalysisPort};
use crate::ports::outbound::{LlmClient, SbomRepository, VulnerabilityDatabase};
use crate::vectordb::InMemoryVectorIndex;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Orchestrates one analysis request over the stored SBOM.
///
/// Holds the four concrete agents and fans out to the selected ones
/// concurrently. The enumeration order (license, health, proactive, vuln)
/// is fixed and observable: `agents_run` and the grouping of findings
/// follow it regardless of which agent finishes first, so identical inputs
/// yield identical responses.
pub struct AnalysisOrchestrator<R, L, V>
where
    R: SbomRepository,
    L: LlmClient,
    V: VulnerabilityDatabase,
{
    repository: Arc<R>,
    license: LicenseAgent,
    health: DependencyHealthAgent<L>,
    proactive: ProactiveVulnerabilityAgent<L>,
    vuln: VulnerabilityScanner<V>,
}

impl<R, L, V> AnalysisOrchestrator<R, L, V>
where
    R: SbomRepository,
    L: LlmClient,
    V: VulnerabilityDatabase,
{
    pub fn new(
        repository: Arc<R>,
        llm: Arc<L>,
        database: Arc<V>,
        index: Arc<InMemoryVectorIndex>,
    ) -> Self {
        Self {
            repository,
            license: LicenseAgent::new(),
            health: DependencyHealthAgent::new(llm.clone()),
            proactive: ProactiveVulnerabilityAgent::new(index, llm),
            vuln: VulnerabilityScanner::new(database),
        }
    }

    /// Folds one agent's outcome into the aggregate response state.
    ///
    /// Optional-agent failures degrade to a logged warning plus whatever
    /// partial findings the agent salvaged; the agent still counts as run.
    fn collect(
        results: &mut Vec<crate::domain::Finding>,
        agents_run: &mut Vec<String>,
        name: &'static str,
        outcome: AgentOutcome,
        license_fatal: bool,
    ) -> Result<(), AnalysisError> {
        agents_run.push(name.to_string());

        match outcome.error {
            Some(AgentError::Cancelled) => return Err(AnalysisError::Cancelled),
            Some(error) if license_fatal && outcome.findings.is_empty() => {
                return Err(AnalysisError::LicenseAgentFailed(error));
            }
            Some(error) => {
                warn!(agent = name, error = %error, "agent failed; keeping partial findings");
            }
            None => {}
        }

        results.extend(outcome.findings);
        Ok(())
    }
}

#[async_trait]
impl<R, L, V> AnalysisPort for AnalysisOrchestrator<R, L, V>
where
    R: SbomRepository,
    L: LlmClient,
    V: VulnerabilityDatabase,
{
    async fn analyze(
        &self,
        cancel: CancellationToken,
        sbom_id: &str,
        selection: AgentSelection,
    ) -> Result<AnalysisResponse, AnalysisError> {
        let sbom = self
            .repository
            .find_by_id(sbom_id)
            .await?
            .ok_or_else(|| AnalysisError::NotFound(sbom_id.to_string()))?;

        // All selected agents run concurrently; unselected slots resolve
        // immediately to None.
        let (license, health, proactive, vuln) = tokio::join!(
            async { Some(self.license.analyze(&cancel, &sbom).await) },
            async {
                if selection.health {
                    Some(self.health.analyze(&cancel, &sbom).await)
                } else {
                    None
                }
            },
            async {
                if selection.proactive {
                    Some(self.proactive.analyze(&cancel, &sbom).await)
                } else {
                    None
                }
            },
            async {
                if selection.vuln {
                    Some(self.vuln.analyze(&cancel, &sbom).await)
                } else {
                    None
                }
            },
        );

        let mut results = Vec::new();
        let mut agents_run = Vec::new();

        if let Some(outcome) = license {
            Self::collect(
                &mut results,
                &mut agents_run,
                self.license.name(),
                outcome,
                true,
            )?;
        }
        if let Some(outcome) = health {
            Self::collect(
                &mut results,
                &mut agents_run,
                self.health.name(),
                outcome,
                false,
            )?;
        }
        if let Some(outcome) = proactive {
            Self::collect(
                &mut results,
                &mut agents_run,
                self.proactive.name(),
                outcome,
                false,
            )?;
        }
        if let Some(outcome) = vuln {
            Self::collect(
                &mut results,
                &mut agents_run,
                self.vuln.name(),
                outcome,
                false,
            )?;
        }

        Ok(AnalysisResponse::new(sbom_id, results, agents_run))
    }
}

use crate::analysis::{AgentError, AgentOutcome, AnalysisAgent};
use crate::domain::{Component, Finding, Sbom, Severity};
use crate::ports::outbound::{LlmClient, UpstreamError};
use crate::vectordb::{Harvester, InMemoryVectorIndex, VectorDocument};
use async_trait::async_trait;
use std::fmt::Write as _;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Number of passages retrieved per component query.
const TOP_K: usize = 3;

/// Minimum cosine similarity for a retrieved passage to be considered.
const SIMILARITY_THRESHOLD: f64 = 0.3;

/// Reply fragments that mean the model found nothing relevant.
const NO_CONCERN_MARKERS: [&str; 3] = [
    "no relevant security concerns",
    "no security issues",
    "no vulnerabilities",
];

/// Retrieval-augmented proactive vulnerability agent.
///
/// Surfaces concerns that have not reached curated vulnerability databases
/// yet: each component is embedded into a query, matched against the
/// security-intelligence index, and the retrieved passages are handed to
/// the LLM to judge applicability. The index is populated lazily by the
/// harvester on the first analysis in the process.
pub struct ProactiveVulnerabilityAgent<L: LlmClient> {
    index: Arc<InMemoryVectorIndex>,
    llm: Arc<L>,
    harvester: Harvester<L>,
}

impl<L: LlmClient> ProactiveVulnerabilityAgent<L> {
    pub fn new(index: Arc<InMemoryVectorIndex>, llm: Arc<L>) -> Self {
        let harvester = Harvester::new(index.clone(), llm.clone());
        Self {
            index,
            llm,
            harvester,
        }
    }

    /// Populates the index on first use. The harvester itself is a no-op
    /// when documents are already present.
    async fn ensure_initialized(&self, cancel: &CancellationToken) -> Result<(), AgentError> {
        match self.harvester.harvest(cancel).await {
            Ok(()) => {}
            Err(UpstreamError::Cancelled) => return Err(AgentError::Cancelled),
            Err(err) => {
                return Err(AgentError::InitFailed(format!(
                    "failed to harvest security intelligence: {err}"
                )));
            }
        }

        if self.index.size() == 0 {
            return Err(AgentError::InitFailed(
                "security intelligence index is empty after harvesting".to_string(),
            ));
        }

        Ok(())
    }

    /// Retrieves the relevant passages for one component, if any.
    async fn retrieve(
        &self,
        cancel: &CancellationToken,
        component: &Component,
    ) -> Result<Option<Vec<VectorDocument>>, UpstreamError> {
        let query = format!(
            "component {} version {} vulnerability security issue",
            component.name, component.version
        );
        let embedding = self.llm.embed(cancel, &query).await?;

        let relevant: Vec<VectorDocument> = self
            .index
            .search(&embedding, TOP_K)
            .into_iter()
            .filter(|scored| scored.similarity > SIMILARITY_THRESHOLD)
            .map(|scored| scored.document)
            .collect();

        Ok((!relevant.is_empty()).then_some(relevant))
    }

    /// Asks the LLM whether the retrieved passages describe a concern for
    /// this component; `None` when the model reports nothing relevant.
    async fn judge(
        &self,
        cancel: &CancellationToken,
        component: &Component,
        documents: &[VectorDocument],
    ) -> Result<Option<String>, UpstreamError> {
        let prompt = analysis_prompt(component, documents);
        let response = self.llm.generate(cancel, &prompt).await?;
        let response = response.trim();

        let lowered = response.to_lowercase();
        if NO_CONCERN_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            return Ok(None);
        }

        Ok(Some(response.to_string()))
    }
}

/// Builds the generation prompt from the numbered retrieved passages.
fn analysis_prompt(component: &Component, documents: &[VectorDocument]) -> String {
    let mut context = String::from("Security Intelligence Context:\n");
    for (position, document) in documents.iter().enumerate() {
        let _ = writeln!(context, "{}. {}", position + 1, document.text);
    }

    format!(
        "Based on the security intelligence context provided, analyze if the component '{name}' \
         version '{version}' has any potential security vulnerabilities or risks.\n\
         \n\
         {context}\n\
         Component to analyze: {name} (version {version})\n\
         \n\
         Instructions:\n\
         1. Look for any mentions of this specific component or similar components\n\
         2. Consider version compatibility and potential security issues\n\
         3. If you find relevant security concerns, summarize them in one sentence\n\
         4. If no relevant security issues are found, respond with \"No relevant security concerns identified\"\n\
         \n\
         Response:",
        name = component.name,
        version = component.version,
        context = context,
    )
}

#[async_trait]
impl<L: LlmClient> AnalysisAgent for ProactiveVulnerabilityAgent<L> {
    fn name(&self) -> &'static str {
        "Proactive Vulnerability Agent"
    }

    async fn analyze(&self, cancel: &CancellationToken, sbom: &Sbom) -> AgentOutcome {
        if let Err(error) = self.ensure_initialized(cancel).await {
            return AgentOutcome::interrupted(Vec::new(), error);
        }

        let mut findings = Vec::new();

        for component in &sbom.components {
            if cancel.is_cancelled() {
                return AgentOutcome::interrupted(findings, AgentError::Cancelled);
            }

            if !component.is_identifiable() {
                continue;
            }

            let documents = match self.retrieve(cancel, component).await {
                Ok(Some(documents)) => documents,
                Ok(None) => continue,
                Err(UpstreamError::Cancelled) => {
                    return AgentOutcome::interrupted(findings, AgentError::Cancelled);
                }
                Err(err) => {
                    warn!(component = %component.name, error = %err, "failed to embed component query");
                    continue;
                }
            };

            match self.judge(cancel, component, &documents).await {
                Ok(Some(concern)) => {
                    findings.push(Finding::new(self.name(), concern, Severity::Medium));
                }
                Ok(None) => {}
                Err(UpstreamError::Cancelled) => {
                    return AgentOutcome::interrupted(findings, AgentError::Cancelled);
                }
                Err(err) => {
                    warn!(component = %component.name, error = %err, "proactive analysis failed");
                }
            }
        }

        AgentOutcome::ok(findings)
    }
}

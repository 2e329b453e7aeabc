use crate::analysis::AgentError;
use crate::application::dto::{AgentSelection, AnalysisResponse};
use crate::ports::outbound::StoreError;
use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Request-level failures of an analysis run.
///
/// Optional-agent failures never surface here; they are logged and
/// contribute empty partial results instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("SBOM not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The license agent failed without producing a single finding.
    #[error("license analysis failed: {0}")]
    LicenseAgentFailed(AgentError),

    #[error("analysis cancelled")]
    Cancelled,
}

/// Entry point of the analysis engine as seen by transports.
#[async_trait]
pub trait AnalysisPort: Send + Sync {
    /// Runs the selected agents over the stored SBOM identified by
    /// `sbom_id` and aggregates their findings into a response.
    async fn analyze(
        &self,
        cancel: CancellationToken,
        sbom_id: &str,
        selection: AgentSelection,
    ) -> Result<AnalysisResponse, AnalysisError>;
}

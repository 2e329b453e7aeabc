/// Analysis agents and their orchestration.
///
/// Each agent focuses on one class of check (license compliance, known
/// vulnerabilities, dependency health, proactive RAG discovery). Agents
/// are independent: they share no state, never observe each other's
/// findings, and tolerate being invoked any number of times per process.
pub mod dependency_health;
pub mod license;
pub mod orchestrator;
pub mod proactive_vuln;
pub mod vuln_scanner;

pub use dependency_health::DependencyHealthAgent;
pub use license::LicenseAgent;
pub use orchestrator::AnalysisOrchestrator;
pub use proactive_vuln::ProactiveVulnerabilityAgent;
pub use vuln_scanner::VulnerabilityScanner;

use crate::domain::{Finding, Sbom};
use crate::ports::outbound::UpstreamError;
use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Per-agent failure kinds.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("analysis cancelled")]
    Cancelled,

    #[error("agent initialization failed: {0}")]
    InitFailed(String),

    #[error("upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("upstream call timed out: {0}")]
    Timeout(String),

    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl From<UpstreamError> for AgentError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Cancelled => AgentError::Cancelled,
            UpstreamError::Timeout => AgentError::Timeout("upstream call timed out".to_string()),
            UpstreamError::Decode(msg) => AgentError::Malformed(msg),
            UpstreamError::Transport(msg) => AgentError::UpstreamUnavailable(msg),
            UpstreamError::Status(code) => {
                AgentError::UpstreamUnavailable(format!("upstream returned status {code}"))
            }
        }
    }
}

/// What one `analyze` invocation produced.
///
/// An agent interrupted mid-run returns whatever findings it had already
/// collected alongside the error, so partial progress is never discarded.
#[derive(Debug)]
pub struct AgentOutcome {
    pub findings: Vec<Finding>,
    pub error: Option<AgentError>,
}

impl AgentOutcome {
    pub fn ok(findings: Vec<Finding>) -> Self {
        Self {
            findings,
            error: None,
        }
    }

    pub fn interrupted(findings: Vec<Finding>, error: AgentError) -> Self {
        Self {
            findings,
            error: Some(error),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.error, Some(AgentError::Cancelled))
    }
}

/// Contract every analysis agent implements.
#[async_trait]
pub trait AnalysisAgent: Send + Sync {
    /// Stable identifier used in finding attribution and `agents_run`.
    fn name(&self) -> &'static str;

    /// Examines the SBOM and returns findings. Implementations check the
    /// cancellation token between per-component iterations and wire it
    /// into in-flight HTTP calls.
    async fn analyze(&self, cancel: &CancellationToken, sbom: &Sbom) -> AgentOutcome;
}

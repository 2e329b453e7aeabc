use crate::ports::outbound::UpstreamError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A known vulnerability affecting one package version, as reported by the
/// external vulnerability database.
#[derive(Debug, Clone, PartialEq)]
pub struct VulnerabilityRecord {
    /// Advisory identifier (e.g. `GHSA-...`, `CVE-...`).
    pub id: String,
    /// Alternate identifiers for the same advisory.
    pub aliases: Vec<String>,
    /// Short human-readable summary, when the database provides one.
    pub summary: Option<String>,
    /// Raw severity score strings (CVSS vectors) in database order.
    pub cvss_vectors: Vec<String>,
}

/// Query contract for an OSV-style public vulnerability database keyed on
/// `{ecosystem, name, version}`.
#[async_trait]
pub trait VulnerabilityDatabase: Send + Sync {
    /// Returns every known vulnerability affecting the given package
    /// version, in the order the database reports them.
    async fn query(
        &self,
        cancel: &CancellationToken,
        ecosystem: &str,
        name: &str,
        version: &str,
    ) -> Result<Vec<VulnerabilityRecord>, UpstreamError>;
}

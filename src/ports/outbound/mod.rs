/// Outbound ports (driven ports) - infrastructure interfaces
///
/// These ports define the interfaces the analysis engine uses to reach
/// external systems (persistence, the local LLM, the vulnerability API).
pub mod llm_client;
pub mod sbom_repository;
pub mod vulnerability_database;

pub use llm_client::LlmClient;
pub use sbom_repository::{SbomRepository, StoreError};
pub use vulnerability_database::{VulnerabilityDatabase, VulnerabilityRecord};

use thiserror::Error;

/// Failure modes of an outbound call to a remote service.
///
/// `Cancelled` is distinguished so callers can abort promptly instead of
/// treating cancellation as yet another upstream hiccup to skip over.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request cancelled")]
    Cancelled,

    #[error("request timed out")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

//! sbom-sentinel - SBOM analysis engine
//!
//! This library ingests CycloneDX JSON documents, persists them, and runs a
//! configurable pipeline of independent analysis agents over them: a
//! deterministic license compliance checker, an external vulnerability
//! lookup, an LLM-backed dependency health assessor, and a
//! retrieval-augmented proactive vulnerability discoverer backed by an
//! in-memory vector index.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture:
//!
//! - **Domain** (`domain`): normalized SBOM, component, and finding types
//! - **Ingestion** (`ingestion`): CycloneDX JSON to domain transform
//! - **Analysis** (`analysis`): the four agents and their orchestrator
//! - **Vector DB** (`vectordb`): cosine-similarity index + harvester
//! - **Ports** (`ports`): interface definitions for infrastructure
//! - **Adapters** (`adapters`): HTTP transport, network clients, SQLite
//! - **Application** (`application`): use cases and DTOs
//! - **Shared** (`shared`): common result/error plumbing
//!
//! # Example
//!
//! ```no_run
//! use sbom_sentinel::prelude::*;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> sbom_sentinel::shared::Result<()> {
//! // Create adapters
//! let repository = Arc::new(SqliteSbomRepository::open("./sentinel.db")?);
//! let llm = Arc::new(OllamaClient::new(
//!     "http://localhost:11434/api/generate",
//!     "http://localhost:11434/api/embeddings",
//! )?);
//! let database = Arc::new(OsvClient::new("https://api.osv.dev/v1/query")?);
//! let index = Arc::new(InMemoryVectorIndex::new());
//!
//! // Ingest and store a document
//! let submit = SubmitSbomUseCase::new(repository.clone());
//! let document = std::fs::read("./sample-sbom.json")?;
//! let sbom_id = submit.execute(&document).await?;
//!
//! // Analyze it
//! let orchestrator = AnalysisOrchestrator::new(repository, llm, database, index);
//! let response = orchestrator
//!     .analyze(CancellationToken::new(), &sbom_id, AgentSelection::all())
//!     .await?;
//! println!("{} findings", response.summary.total_findings);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod analysis;
pub mod application;
pub mod config;
pub mod domain;
pub mod ingestion;
pub mod ports;
pub mod shared;
pub mod vectordb;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::inbound::rest::{router, AppState};
    pub use crate::adapters::outbound::network::{
        CachingVulnerabilityDatabase, OllamaClient, OsvClient,
    };
    pub use crate::adapters::outbound::persistence::SqliteSbomRepository;
    pub use crate::analysis::{AnalysisAgent, AnalysisOrchestrator};
    pub use crate::application::dto::{AgentSelection, AnalysisResponse};
    pub use crate::application::use_cases::SubmitSbomUseCase;
    pub use crate::config::Config;
    pub use crate::domain::{Component, Finding, Sbom, Severity};
    pub use crate::ingestion::CycloneDxParser;
    pub use crate::ports::inbound::AnalysisPort;
    pub use crate::ports::outbound::{LlmClient, SbomRepository, VulnerabilityDatabase};
    pub use crate::shared::Result;
    pub use crate::vectordb::{Harvester, InMemoryVectorIndex};
}

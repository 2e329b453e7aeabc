use crate::ingestion::{CycloneDxParser, ParseError};
use crate::ports::outbound::{SbomRepository, StoreError};
use std::sync::Arc;

/// Failures of SBOM submission, split so the transport can map parse
/// problems to client errors and storage problems to server errors.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// SubmitSbomUseCase - parses an uploaded CycloneDX document and persists
/// the resulting SBOM under its identifier (upsert).
pub struct SubmitSbomUseCase {
    parser: CycloneDxParser,
    repository: Arc<dyn SbomRepository>,
}

impl SubmitSbomUseCase {
    pub fn new(repository: Arc<dyn SbomRepository>) -> Self {
        Self {
            parser: CycloneDxParser::new(),
            repository,
        }
    }

    /// Ingests one document and returns the stored SBOM's identifier.
    pub async fn execute(&self, raw: &[u8]) -> Result<String, SubmitError> {
        let sbom = self.parser.parse(raw)?;
        self.repository.store(&sbom).await?;
        Ok(sbom.id)
    }
}

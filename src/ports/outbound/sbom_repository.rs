use crate::domain::Sbom;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("failed to encode stored document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Repository contract for persisting and retrieving SBOM documents.
///
/// `store` is an upsert keyed on `sbom.id`: resubmitting a document under
/// an existing identifier replaces the stored version (last write wins).
/// A missing document is signalled as `Ok(None)` rather than an error so
/// callers can map it onto their own not-found handling.
#[async_trait]
pub trait SbomRepository: Send + Sync {
    /// Persists an SBOM document, replacing any prior document with the
    /// same identifier.
    async fn store(&self, sbom: &Sbom) -> Result<(), StoreError>;

    /// Retrieves an SBOM document by its unique identifier.
    async fn find_by_id(&self, id: &str) -> Result<Option<Sbom>, StoreError>;
}

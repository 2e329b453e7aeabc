/// Ingestion of SBOM documents into the domain model.
///
/// CycloneDX JSON is the only accepted input format.
pub mod cyclonedx;

pub use cyclonedx::{CycloneDxParser, ParseError};

/// In-memory vector similarity index and the security-intelligence
/// harvester that populates it.
pub mod harvester;
pub mod memory;

pub use harvester::Harvester;
pub use memory::{IndexError, InMemoryVectorIndex, ScoredDocument, VectorDocument};

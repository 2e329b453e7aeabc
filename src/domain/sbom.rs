use crate::domain::Component;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A Software Bill of Materials document in normalized form.
///
/// Instances are produced by the ingestor and stored immutably; agents
/// treat them as read-only snapshots. Component order is the order of the
/// source document. `metadata` uses a sorted map so a stored document
/// serializes identically on every round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sbom {
    /// Globally unique identifier, from the source serial number or
    /// generated at ingestion time.
    pub id: String,
    pub name: String,
    pub components: Vec<Component>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Sbom {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            components: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }
}

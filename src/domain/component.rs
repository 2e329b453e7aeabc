use serde::{Deserialize, Serialize};

/// A single software component inside an SBOM.
///
/// All fields except `name` may legitimately be empty: many real-world
/// CycloneDX documents omit versions, purls, or license data, and the
/// agents decide per-field whether such a component is analyzable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Human-readable name of the component.
    pub name: String,
    /// Version identifier; empty when the source document omits it.
    #[serde(default)]
    pub version: String,
    /// Package URL identifying ecosystem, namespace, name, and version.
    #[serde(default)]
    pub purl: String,
    /// Single license identifier or expression; empty when unknown.
    #[serde(default)]
    pub license: String,
}

impl Component {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        purl: impl Into<String>,
        license: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            purl: purl.into(),
            license: license.into(),
        }
    }

    /// Whether the component carries enough identity to be queried against
    /// external services keyed on (name, version).
    pub fn is_identifiable(&self) -> bool {
        !self.name.is_empty() && !self.version.is_empty()
    }
}

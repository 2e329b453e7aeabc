use crate::ports::outbound::{LlmClient, UpstreamError};
use crate::vectordb::{InMemoryVectorIndex, VectorDocument};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// One curated security-intelligence passage prior to embedding.
#[derive(Debug, Clone)]
pub struct SecurityIntelligence {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub component: &'static str,
    pub version: &'static str,
    pub severity: &'static str,
    pub source: &'static str,
    pub date: &'static str,
}

/// Harvester populating the vector index with the security-intelligence
/// corpus.
///
/// Harvesting embeds each passage through the LLM embeddings endpoint and
/// inserts the result; a passage whose embedding fails is skipped so one
/// flaky call cannot abort the whole corpus. Harvesting is idempotent: a
/// non-empty index is left untouched.
pub struct Harvester<L: LlmClient> {
    index: Arc<InMemoryVectorIndex>,
    llm: Arc<L>,
}

impl<L: LlmClient> Harvester<L> {
    pub fn new(index: Arc<InMemoryVectorIndex>, llm: Arc<L>) -> Self {
        Self { index, llm }
    }

    /// Embeds the corpus into the index. No-op when the index already
    /// holds documents. Returns `Cancelled` as soon as the token fires.
    pub async fn harvest(&self, cancel: &CancellationToken) -> Result<(), UpstreamError> {
        if self.index.size() > 0 {
            return Ok(());
        }

        let corpus = security_intelligence_corpus();
        let mut inserted = 0usize;

        for intelligence in &corpus {
            if cancel.is_cancelled() {
                return Err(UpstreamError::Cancelled);
            }

            let text = canonical_text(intelligence);
            let vector = match self.llm.embed(cancel, &text).await {
                Ok(vector) => vector,
                Err(UpstreamError::Cancelled) => return Err(UpstreamError::Cancelled),
                Err(err) => {
                    warn!(document = intelligence.id, error = %err, "failed to embed security intelligence document");
                    continue;
                }
            };

            let document = VectorDocument {
                id: intelligence.id.to_string(),
                text,
                vector,
                metadata: HashMap::from([
                    ("component".to_string(), intelligence.component.to_string()),
                    ("version".to_string(), intelligence.version.to_string()),
                    ("severity".to_string(), intelligence.severity.to_string()),
                    ("source".to_string(), intelligence.source.to_string()),
                    ("date".to_string(), intelligence.date.to_string()),
                    ("title".to_string(), intelligence.title.to_string()),
                ]),
            };

            match self.index.add(document) {
                Ok(()) => inserted += 1,
                Err(err) => {
                    warn!(document = intelligence.id, error = %err, "failed to index security intelligence document");
                }
            }
        }

        info!(documents = inserted, "security intelligence corpus harvested");
        Ok(())
    }
}

/// Canonical text representation of one passage, as it is embedded.
fn canonical_text(intelligence: &SecurityIntelligence) -> String {
    format!(
        "Title: {}. Description: {} Component: {}, Version: {}. Severity: {}. Source: {}.",
        intelligence.title,
        intelligence.description,
        intelligence.component,
        intelligence.version,
        intelligence.severity,
        intelligence.source
    )
}

/// The fixed corpus of curated security-intelligence passages.
pub fn security_intelligence_corpus() -> Vec<SecurityIntelligence> {
    vec![
        SecurityIntelligence {
            id: "vuln-001",
            title: "Deserialization Vulnerability in acme-serializer",
            description: "A new deserialization issue is being discussed for the 'acme-serializer' library version 1.2.3, allowing potential remote code execution. Researchers have identified unsafe deserialization patterns that could be exploited.",
            component: "acme-serializer",
            version: "1.2.3",
            severity: "Critical",
            source: "Security Mailing List",
            date: "2024-01-15",
        },
        SecurityIntelligence {
            id: "vuln-002",
            title: "Memory Leak in data-processor",
            description: "Security researchers are reporting memory leak issues in data-processor version 2.1.0 that could lead to denial of service attacks. The leak occurs during heavy processing workloads.",
            component: "data-processor",
            version: "2.1.0",
            severity: "High",
            source: "Research Blog",
            date: "2024-01-14",
        },
        SecurityIntelligence {
            id: "vuln-003",
            title: "SQL Injection in database-connector",
            description: "A potential SQL injection vulnerability has been identified in database-connector library version 3.4.1. The issue affects parameterized query handling in certain edge cases.",
            component: "database-connector",
            version: "3.4.1",
            severity: "High",
            source: "Security Forum",
            date: "2024-01-13",
        },
        SecurityIntelligence {
            id: "vuln-004",
            title: "Path Traversal in file-manager",
            description: "Discussions on security forums indicate a path traversal vulnerability in file-manager version 1.8.0 that allows access to files outside the intended directory structure.",
            component: "file-manager",
            version: "1.8.0",
            severity: "Medium",
            source: "Security Forum",
            date: "2024-01-12",
        },
        SecurityIntelligence {
            id: "vuln-005",
            title: "XSS Vulnerability in web-utils",
            description: "Cross-site scripting vulnerability discovered in web-utils version 2.3.4. The issue affects input sanitization functions and could allow malicious script execution.",
            component: "web-utils",
            version: "2.3.4",
            severity: "Medium",
            source: "Security Blog",
            date: "2024-01-11",
        },
        SecurityIntelligence {
            id: "vuln-006",
            title: "Privilege Escalation in auth-service",
            description: "Research indicates a privilege escalation issue in auth-service library version 4.2.1 where normal users can gain administrative privileges through token manipulation.",
            component: "auth-service",
            version: "4.2.1",
            severity: "Critical",
            source: "Research Paper",
            date: "2024-01-10",
        },
        SecurityIntelligence {
            id: "vuln-007",
            title: "Buffer Overflow in image-processor",
            description: "Security mailing lists are discussing a buffer overflow vulnerability in image-processor version 1.5.2 when processing specially crafted image files.",
            component: "image-processor",
            version: "1.5.2",
            severity: "High",
            source: "Security Mailing List",
            date: "2024-01-09",
        },
        SecurityIntelligence {
            id: "vuln-008",
            title: "Information Disclosure in logger-util",
            description: "Researchers have identified an information disclosure vulnerability in logger-util version 0.9.1 that may leak sensitive data in log files under certain configurations.",
            component: "logger-util",
            version: "0.9.1",
            severity: "Low",
            source: "Research Blog",
            date: "2024-01-08",
        },
    ]
}

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// A document stored in the vector index.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    /// Unique identifier within the index.
    pub id: String,
    /// The source passage the vector was computed from.
    pub text: String,
    /// Dense embedding; dimensionality is fixed per index instance.
    pub vector: Vec<f64>,
    pub metadata: HashMap<String, String>,
}

/// One search hit: a stored document and its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: VectorDocument,
    pub similarity: f64,
}

/// Errors raised by index mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("document id cannot be empty")]
    EmptyId,

    #[error("document vector cannot be empty")]
    EmptyVector,

    #[error("vector dimensionality mismatch: index holds {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },
}

#[derive(Debug, Default)]
struct IndexState {
    documents: HashMap<String, VectorDocument>,
    /// Established at the first successful insert, reset by `clear`.
    dimension: Option<usize>,
}

/// A linear-scan cosine-similarity index.
///
/// Sized for corpora of tens to low hundreds of documents; every search
/// observes a consistent snapshot via a reader-writer lock. All operations
/// are CPU-only and never block on I/O.
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    state: RwLock<IndexState>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document, establishing the index dimensionality on the
    /// first insert. Replaces any existing document with the same id.
    pub fn add(&self, document: VectorDocument) -> Result<(), IndexError> {
        if document.id.is_empty() {
            return Err(IndexError::EmptyId);
        }
        if document.vector.is_empty() {
            return Err(IndexError::EmptyVector);
        }

        let mut state = self.state.write().expect("vector index lock poisoned");
        match state.dimension {
            Some(expected) if expected != document.vector.len() => Err(IndexError::Dimension {
                expected,
                actual: document.vector.len(),
            }),
            _ => {
                state.dimension.get_or_insert(document.vector.len());
                state.documents.insert(document.id.clone(), document);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<VectorDocument> {
        self.state
            .read()
            .expect("vector index lock poisoned")
            .documents
            .get(id)
            .cloned()
    }

    /// Removes a document; returns true iff it was present.
    pub fn delete(&self, id: &str) -> bool {
        self.state
            .write()
            .expect("vector index lock poisoned")
            .documents
            .remove(id)
            .is_some()
    }

    /// Returns the `k` most similar documents, sorted by similarity
    /// descending with ties broken by document id for determinism.
    /// Documents whose dimensionality does not match the query are
    /// excluded from scoring rather than treated as errors.
    pub fn search(&self, query: &[f64], k: usize) -> Vec<ScoredDocument> {
        if query.is_empty() || k == 0 {
            return Vec::new();
        }

        let state = self.state.read().expect("vector index lock poisoned");
        let mut results: Vec<ScoredDocument> = state
            .documents
            .values()
            .filter(|doc| doc.vector.len() == query.len())
            .map(|doc| ScoredDocument {
                similarity: cosine_similarity(query, &doc.vector),
                document: doc.clone(),
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        results.truncate(k);
        results
    }

    pub fn size(&self) -> usize {
        self.state
            .read()
            .expect("vector index lock poisoned")
            .documents
            .len()
    }

    /// Removes every document and resets the established dimensionality.
    pub fn clear(&self) {
        let mut state = self.state.write().expect("vector index lock poisoned");
        state.documents.clear();
        state.dimension = None;
    }
}

/// Cosine similarity of two equal-length vectors; 0 when either side has
/// zero norm.
fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

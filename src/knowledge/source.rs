//! Retrieval index trait and shared knowledge types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Context used when retrieval yields nothing.
pub const NO_CONTEXT_FOUND: &str = "No relevant context found in knowledge base.";

/// A unit of indexable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Where the text came from (file path or caller-supplied label).
    pub source: String,
    /// The text itself.
    pub content: String,
}

impl Document {
    #[must_use]
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}

/// Errors from retrieval and indexing.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Knowledge store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to (de)serialize index: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("No documents found to index")]
    EmptyCorpus,
    #[error("Retrieval backend error: {0}")]
    Backend(String),
}

/// Similarity index over text chunks.
pub trait RetrievalIndex: Send + Sync {
    /// Add chunks to the index.
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError` if the backend cannot accept the documents.
    fn index(&mut self, documents: Vec<Document>) -> Result<(), RetrievalError>;

    /// Return up to `k` chunk texts ordered by descending similarity.
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError` if the lookup fails.
    fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<String>, RetrievalError>;

    /// Number of indexed chunks.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

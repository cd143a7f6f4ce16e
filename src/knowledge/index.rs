//! Lexical similarity index persisted as JSON.
//!
//! Chunks are scored against a query by cosine similarity of TF-IDF weighted
//! term vectors.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use super::source::{Document, RetrievalError, RetrievalIndex};

/// Lowercased alphanumeric terms of at least two characters.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
}

fn term_counts(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in tokenize(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexedChunk {
    source: String,
    text: String,
    terms: HashMap<String, u32>,
}

/// In-memory term index with JSON persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermIndex {
    chunks: Vec<IndexedChunk>,
    doc_freq: HashMap<String, u32>,
}

impl TermIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over the given chunks.
    #[must_use]
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let mut index = Self::new();
        index.add(documents);
        index
    }

    fn add(&mut self, documents: Vec<Document>) {
        for doc in documents {
            let terms = term_counts(&doc.content);
            for term in terms.keys() {
                *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            self.chunks.push(IndexedChunk {
                source: doc.source,
                text: doc.content,
                terms,
            });
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn idf(&self, term: &str) -> f64 {
        let n = self.chunks.len() as f64;
        let df = f64::from(self.doc_freq.get(term).copied().unwrap_or(0));
        ((n + 1.0) / (df + 1.0)).ln() + 1.0
    }

    fn weights(&self, counts: &HashMap<String, u32>) -> HashMap<String, f64> {
        counts
            .iter()
            .map(|(term, &count)| (term.clone(), f64::from(count) * self.idf(term)))
            .collect()
    }

    fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
        let dot: f64 = a
            .iter()
            .filter_map(|(term, wa)| b.get(term).map(|wb| wa * wb))
            .sum();
        if dot == 0.0 {
            return 0.0;
        }
        let norm = |v: &HashMap<String, f64>| v.values().map(|w| w * w).sum::<f64>().sqrt();
        dot / (norm(a) * norm(b))
    }

    /// Chunk sources, in index order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(|c| c.source.as_str())
    }

    /// Load a persisted index. Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError` if the file exists but cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Option<Self>, RetrievalError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let index: Self = serde_json::from_str(&content)?;
                tracing::debug!(path = %path.display(), chunks = index.chunks.len(), "Loaded index");
                Ok(Some(index))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Save the index atomically (temp file + sync + rename).
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError` if file operations fail.
    pub async fn save(&self, path: &Path) -> Result<(), RetrievalError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string(self)?;
        let temp_path = path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_data().await?;
        drop(file);

        tokio::fs::rename(&temp_path, path).await?;
        tracing::info!(path = %path.display(), chunks = self.chunks.len(), "Saved index");
        Ok(())
    }
}

impl RetrievalIndex for TermIndex {
    fn index(&mut self, documents: Vec<Document>) -> Result<(), RetrievalError> {
        self.add(documents);
        Ok(())
    }

    fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<String>, RetrievalError> {
        if k == 0 || self.chunks.is_empty() {
            return Ok(Vec::new());
        }

        let query_weights = self.weights(&term_counts(query));
        let mut scored: Vec<(f64, usize)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| (Self::cosine(&query_weights, &self.weights(&chunk.terms)), i))
            .collect();

        // Stable sort keeps index order among equal scores, so chunks with no
        // shared terms still fill the result after the scored ones.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, i)| self.chunks[i].text.clone())
            .collect())
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }
}

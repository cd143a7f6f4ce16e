//! Knowledge store: lazily initialized retrieval over a document directory.

use tokio::sync::Mutex;

use crate::config::KnowledgeConfig;

use super::documents::{load_documents, TextSplitter};
use super::index::TermIndex;
use super::source::{Document, RetrievalError, RetrievalIndex, NO_CONTEXT_FOUND};

/// Build the retrieval query for a generation request.
#[must_use]
pub fn context_query(topic: &str, lens: &str, objective: &str) -> String {
    format!("{topic} {lens} {objective}")
}

/// Persisted collection of text chunks answering similarity queries.
///
/// The underlying index is loaded on first use: from the persisted index file
/// if present, otherwise by indexing the knowledge directory. Lookups never
/// fail to the caller.
pub struct KnowledgeStore {
    config: KnowledgeConfig,
    index: Mutex<Option<Box<dyn RetrievalIndex>>>,
}

impl KnowledgeStore {
    /// Create an uninitialized store.
    #[must_use]
    pub fn new(config: KnowledgeConfig) -> Self {
        Self {
            config,
            index: Mutex::new(None),
        }
    }

    /// Create a store around an already built index.
    #[must_use]
    pub fn with_index(config: KnowledgeConfig, index: Box<dyn RetrievalIndex>) -> Self {
        Self {
            config,
            index: Mutex::new(Some(index)),
        }
    }

    #[must_use]
    pub fn config(&self) -> &KnowledgeConfig {
        &self.config
    }

    /// Whether an index is loaded.
    pub async fn is_initialized(&self) -> bool {
        self.index.lock().await.is_some()
    }

    /// Number of indexed chunks, or zero if not initialized.
    pub async fn len(&self) -> usize {
        self.index.lock().await.as_ref().map_or(0, |i| i.len())
    }

    /// Load source documents from the knowledge directory or a subdirectory of it.
    pub async fn load_documents(&self, subdir: Option<&str>) -> Vec<Document> {
        let dir = match subdir {
            Some(sub) => self.config.knowledge_dir.join(sub),
            None => self.config.knowledge_dir.clone(),
        };
        load_documents(&dir).await
    }

    /// Chunk and index documents, persist the index, and make it current.
    ///
    /// With `None`, documents are loaded from the knowledge directory.
    /// Returns the number of indexed chunks.
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError::EmptyCorpus` if there is nothing to index, or
    /// an I/O error if the index cannot be persisted.
    pub async fn build(&self, documents: Option<Vec<Document>>) -> Result<usize, RetrievalError> {
        let index = self.build_index(documents).await?;
        let chunks = index.len();
        *self.index.lock().await = Some(Box::new(index));
        Ok(chunks)
    }

    async fn build_index(
        &self,
        documents: Option<Vec<Document>>,
    ) -> Result<TermIndex, RetrievalError> {
        let documents = match documents {
            Some(docs) => docs,
            None => self.load_documents(None).await,
        };
        if documents.is_empty() {
            tracing::warn!("No documents found to index");
            return Err(RetrievalError::EmptyCorpus);
        }

        let splitter = TextSplitter::new(self.config.chunk_size, self.config.chunk_overlap);
        let chunks = splitter.split_documents(&documents);
        let index = TermIndex::from_documents(chunks);
        index.save(&self.config.index_path()).await?;

        tracing::info!(
            chunks = index.len(),
            documents = documents.len(),
            "Indexed knowledge documents"
        );
        Ok(index)
    }

    async fn open_index(&self) -> Result<TermIndex, RetrievalError> {
        let path = self.config.index_path();
        if let Some(index) = TermIndex::load(&path).await? {
            tracing::info!(path = %path.display(), "Loaded knowledge index");
            return Ok(index);
        }
        tracing::info!(path = %path.display(), "No existing index found, building");
        self.build_index(None).await
    }

    /// Load the persisted index, building it from source documents if absent.
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError` if neither loading nor building succeeds.
    pub async fn load(&self) -> Result<(), RetrievalError> {
        let index = self.open_index().await?;
        *self.index.lock().await = Some(Box::new(index));
        Ok(())
    }

    /// Up to `k` chunks most similar to `query`; empty on any failure.
    pub async fn search(&self, query: &str, k: usize) -> Vec<String> {
        let mut slot = self.index.lock().await;
        if slot.is_none() {
            match self.open_index().await {
                Ok(index) => *slot = Some(Box::new(index)),
                Err(e) => {
                    tracing::warn!(error = %e, "Knowledge index not available");
                    return Vec::new();
                }
            }
        }

        let Some(index) = slot.as_ref() else {
            return Vec::new();
        };
        match index.similarity_search(query, k) {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!(error = %e, "Knowledge search failed");
                Vec::new()
            }
        }
    }

    /// Combined context for a generation request.
    ///
    /// Chunks are joined with a blank line in similarity order. Returns
    /// [`NO_CONTEXT_FOUND`] when nothing is retrieved.
    pub async fn get_context(&self, topic: &str, lens: &str, objective: &str, k: usize) -> String {
        let query = context_query(topic, lens, objective);
        let chunks = self.search(&query, k).await;
        tracing::debug!(%query, k, retrieved = chunks.len(), "Retrieved context");

        if chunks.is_empty() {
            return NO_CONTEXT_FOUND.to_string();
        }
        chunks.join("\n\n")
    }
}

impl std::fmt::Debug for KnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

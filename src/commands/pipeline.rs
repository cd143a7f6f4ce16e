//! Wiring of configuration, LLM client and knowledge store into commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ai::{ClientSetupError, GenerationError, LlmClient};
use crate::batch::{
    export_results, BatchError, BatchResult, BatchScheduler, REFERENCE_END, REFERENCE_START,
};
use crate::config::{AppConfig, KnowledgeConfig};
use crate::content::{
    CalendarError, CalendarStore, ContentGenerator, ContentKind, GenerationRequest,
};
use crate::knowledge::{KnowledgeStore, RetrievalError};
use crate::validation::{QualityValidator, ValidationOutcome, ValidationResult};

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Setup(#[from] ClientSetupError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("Knowledge error: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Generated text plus its optional validation.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub content: String,
    pub word_count: usize,
    pub validation: Option<ValidationOutcome>,
}

/// Configured pipeline components.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: AppConfig,
    llm: LlmClient,
    knowledge: Arc<KnowledgeStore>,
}

impl Pipeline {
    /// Build from configuration, creating the provider from `[ai]`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Setup` for an unknown model alias or a
    /// missing API key.
    pub fn from_config(config: AppConfig) -> Result<Self, CommandError> {
        let llm = LlmClient::from_config(&config)?;
        Ok(Self::new(config, llm))
    }

    /// Build around an existing client.
    #[must_use]
    pub fn new(config: AppConfig, llm: LlmClient) -> Self {
        let knowledge = Arc::new(KnowledgeStore::new(config.knowledge.clone()));
        Self {
            config,
            llm,
            knowledge,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn knowledge(&self) -> &Arc<KnowledgeStore> {
        &self.knowledge
    }

    /// Generator for `kind`; retrieval is attached only when enabled in config.
    #[must_use]
    pub fn generator(&self, kind: ContentKind) -> ContentGenerator {
        let knowledge = self
            .config
            .pipeline
            .use_rag
            .then(|| Arc::clone(&self.knowledge));
        ContentGenerator::new(kind, self.llm.clone(), knowledge)
    }

    #[must_use]
    pub fn validator(&self) -> QualityValidator {
        QualityValidator::new(self.llm.clone()).with_min_score(self.config.pipeline.min_score)
    }

    #[must_use]
    pub fn scheduler(&self, kind: ContentKind) -> BatchScheduler {
        BatchScheduler::new(self.generator(kind), self.validator())
            .with_max_retries(self.config.pipeline.max_retries)
    }

    /// Generate one piece, optionally re-validating it.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Generation` if the generation call fails.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        validate: bool,
    ) -> Result<GenerateReport, CommandError> {
        let content = self.generator(request.kind).generate_request(request).await?;

        let validation = if validate {
            let outcome = self
                .validator()
                .validate_with_retry(
                    &content.text,
                    request.kind.label(),
                    &request.kind.target_words(),
                    self.config.pipeline.validation_retries,
                )
                .await;
            Some(outcome)
        } else {
            None
        };

        Ok(GenerateReport {
            content: content.text,
            word_count: content.word_count,
            validation,
        })
    }

    /// Validate the contents of a file.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Read` if the file cannot be read.
    pub async fn validate_file(
        &self,
        kind: ContentKind,
        path: &Path,
    ) -> Result<ValidationResult, CommandError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CommandError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(self
            .validator()
            .validate(&content, kind.label(), &kind.target_words())
            .await)
    }

    /// Run a batch over the reference calendar and export the results.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Calendar` if the range is inverted or selects
    /// no entries, and `CommandError::Batch` if the results cannot be
    /// written.
    pub async fn batch(
        &self,
        kind: ContentKind,
        start: u32,
        end: u32,
        output: &Path,
    ) -> Result<Vec<BatchResult>, CommandError> {
        let calendar = CalendarStore::reference();
        calendar.check_range(start, end)?;

        let scheduler = self.scheduler(kind);
        if (start, end) == (REFERENCE_START, REFERENCE_END) {
            return Ok(scheduler.run_reference_batch(output).await?);
        }

        let results = scheduler.process_batch(&calendar, start, end).await;
        export_results(&results, output).await?;
        Ok(results)
    }
}

/// Rebuild the knowledge index from the knowledge directory, or one of its
/// subdirectories. Returns the number of indexed chunks.
///
/// # Errors
///
/// Returns `CommandError::Retrieval` if there is nothing to index or the
/// index cannot be written.
pub async fn rebuild_index(
    config: &KnowledgeConfig,
    subdir: Option<&str>,
) -> Result<usize, CommandError> {
    let store = KnowledgeStore::new(config.clone());
    let documents = store.load_documents(subdir).await;
    Ok(store.build(Some(documents)).await?)
}

//! Configuration types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Minimum passing score on the 0-10 validation scale.
pub const MIN_SCORE: f64 = 8.0;

/// LLM provider kind.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Any OpenAI-compatible chat-completions endpoint (OpenRouter by default).
    #[default]
    OpenRouter,
    /// Anthropic Messages API.
    Claude,
}

/// Configuration for the LLM client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Provider to use (openrouter or claude).
    #[serde(default)]
    pub provider: ProviderKind,
    /// Model alias from the model table, or a literal model id.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL for the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable name for the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Upper bound on a single completion round-trip.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "free".to_string()
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Named model aliases (`free`, `cheap`, `quality`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ModelTable(BTreeMap<String, String>);

impl Default for ModelTable {
    fn default() -> Self {
        Self(
            [
                ("free", "meta-llama/llama-3.1-8b-instruct:free"),
                ("cheap", "openai/gpt-3.5-turbo"),
                ("quality", "anthropic/claude-3-haiku"),
            ]
            .into_iter()
            .map(|(alias, id)| (alias.to_string(), id.to_string()))
            .collect(),
        )
    }
}

impl ModelTable {
    /// Resolve an alias or literal model id.
    ///
    /// Names containing a `/` are treated as provider-qualified model ids and
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownModel` if the name is neither a known
    /// alias nor a literal model id.
    pub fn resolve(&self, name: &str) -> Result<String, ConfigError> {
        if let Some(id) = self.0.get(name) {
            return Ok(id.clone());
        }
        if name.contains('/') {
            return Ok(name.to_string());
        }
        Err(ConfigError::UnknownModel {
            name: name.to_string(),
            known: self.aliases().map(String::from).collect(),
        })
    }

    /// Iterate over configured aliases in sorted order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Add or replace an alias.
    pub fn insert(&mut self, alias: impl Into<String>, model_id: impl Into<String>) {
        self.0.insert(alias.into(), model_id.into());
    }
}

/// Generation/validation loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Passing threshold, compared with `>=`.
    pub min_score: f64,
    /// Regenerate-and-revalidate attempts per calendar entry.
    pub max_retries: u32,
    /// Re-validation attempts on identical content.
    pub validation_retries: u32,
    /// Augment generation prompts with retrieved context.
    pub use_rag: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_score: MIN_SCORE,
            max_retries: 3,
            validation_retries: 3,
            use_rag: true,
        }
    }
}

/// Knowledge store locations and chunking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Directory holding source `.md` / `.txt` documents.
    pub knowledge_dir: PathBuf,
    /// Directory holding persisted indexes.
    pub vector_store_dir: PathBuf,
    /// Collection name; the index is persisted as `<collection>.json`.
    pub collection: String,
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            knowledge_dir: PathBuf::from("./knowledge_bases"),
            vector_store_dir: PathBuf::from("./vector_stores"),
            collection: "content_knowledge".to_string(),
            chunk_size: 1500,
            chunk_overlap: 300,
        }
    }
}

impl KnowledgeConfig {
    /// Path of the persisted index for this collection.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.vector_store_dir
            .join(format!("{}.json", self.collection))
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ai: AiConfig,
    pub models: ModelTable,
    pub pipeline: PipelineConfig,
    pub knowledge: KnowledgeConfig,
}

impl AppConfig {
    /// Resolve the configured model alias to a concrete model id.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownModel` for an unknown alias.
    pub fn model_id(&self) -> Result<String, ConfigError> {
        self.models.resolve(&self.ai.model)
    }
}

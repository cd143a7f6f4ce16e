//! Retrieval-augmented content generation.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::ai::{
    format_generation_prompt, GenerationError, LlmClient, PromptFields, SIGNATURE_PHRASES,
};
use crate::knowledge::KnowledgeStore;

use super::calendar::CalendarEntry;
use super::kind::ContentKind;
use super::types::{GeneratedContent, GenerationRequest};

/// Context placeholder used when retrieval is disabled or unavailable.
pub const NO_CONTEXT_AVAILABLE: &str = "No context available.";

/// Chooses which signature phrase a prompt asks for.
pub trait PhrasePicker: Send + Sync {
    fn pick(&self, phrases: &[&'static str]) -> &'static str;
}

/// Uniform choice from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPhrase;

impl PhrasePicker for RandomPhrase {
    fn pick(&self, phrases: &[&'static str]) -> &'static str {
        phrases
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or_default()
    }
}

/// Always the phrase at a fixed position (wrapping).
#[derive(Debug, Clone, Copy)]
pub struct FixedPhrase(pub usize);

impl PhrasePicker for FixedPhrase {
    fn pick(&self, phrases: &[&'static str]) -> &'static str {
        if phrases.is_empty() {
            return "";
        }
        phrases[self.0 % phrases.len()]
    }
}

/// Reproducible choice from a seeded RNG.
#[derive(Debug)]
pub struct SeededPhrase(Mutex<StdRng>);

impl SeededPhrase {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }
}

impl PhrasePicker for SeededPhrase {
    fn pick(&self, phrases: &[&'static str]) -> &'static str {
        let Ok(mut rng) = self.0.lock() else {
            return phrases.first().copied().unwrap_or_default();
        };
        phrases.choose(&mut *rng).copied().unwrap_or_default()
    }
}

/// Produces one piece of content of a fixed kind.
#[derive(Clone)]
pub struct ContentGenerator {
    kind: ContentKind,
    llm: LlmClient,
    knowledge: Option<Arc<KnowledgeStore>>,
    picker: Arc<dyn PhrasePicker>,
}

impl std::fmt::Debug for ContentGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentGenerator")
            .field("kind", &self.kind)
            .field("llm", &self.llm)
            .field("rag", &self.knowledge.is_some())
            .finish_non_exhaustive()
    }
}

impl ContentGenerator {
    /// Create a generator. Without a knowledge store every request runs
    /// without retrieval.
    #[must_use]
    pub fn new(kind: ContentKind, llm: LlmClient, knowledge: Option<Arc<KnowledgeStore>>) -> Self {
        Self {
            kind,
            llm,
            knowledge,
            picker: Arc::new(RandomPhrase),
        }
    }

    #[must_use]
    pub fn with_phrase_picker(mut self, picker: Arc<dyn PhrasePicker>) -> Self {
        self.picker = picker;
        self
    }

    #[must_use]
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    async fn context_for(&self, topic: &str, lens: &str, objective: &str, use_rag: bool) -> String {
        match (&self.knowledge, use_rag) {
            (Some(store), true) => {
                store
                    .get_context(topic, lens, objective, self.kind.retrieval_depth())
                    .await
            }
            _ => NO_CONTEXT_AVAILABLE.to_string(),
        }
    }

    /// Generate one piece about `topic`, framed by `lens` and `objective`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Content` wrapping the completion failure.
    pub async fn generate(
        &self,
        topic: &str,
        lens: &str,
        objective: &str,
        use_rag: bool,
    ) -> Result<String, GenerationError> {
        let context = self.context_for(topic, lens, objective, use_rag).await;
        let signature_phrase = self.picker.pick(&SIGNATURE_PHRASES);
        let prompt = format_generation_prompt(
            self.kind.template(),
            &PromptFields {
                topic,
                lens,
                objective,
                context: &context,
                signature_phrase,
            },
        );

        tracing::debug!(kind = %self.kind, %topic, %lens, %objective, use_rag, "Generating content");

        self.llm
            .complete(&prompt, self.kind.temperature(), self.kind.max_tokens())
            .await
            .map_err(|source| GenerationError::Content {
                label: self.kind.noun(),
                source: Box::new(source),
            })
    }

    /// Generate from a full request, returning text with its word count.
    ///
    /// # Errors
    ///
    /// See [`ContentGenerator::generate`].
    pub async fn generate_request(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, GenerationError> {
        let text = self
            .generate(
                &request.topic,
                &request.lens,
                &request.objective,
                request.use_rag,
            )
            .await?;
        Ok(GeneratedContent::new(text, self.kind))
    }

    /// Generate for a calendar entry, with retrieval enabled.
    ///
    /// # Errors
    ///
    /// See [`ContentGenerator::generate`].
    pub async fn generate_from_calendar(
        &self,
        entry: &CalendarEntry,
    ) -> Result<String, GenerationError> {
        self.generate(
            &entry.topic,
            entry.lens.as_str(),
            entry.objective.as_str(),
            true,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ScriptedProvider;
    use crate::config::KnowledgeConfig;
    use crate::knowledge::{Document, NO_CONTEXT_FOUND};
    use std::time::Duration;

    fn client(provider: &Arc<ScriptedProvider>) -> LlmClient {
        LlmClient::new(provider.clone(), "test-model", Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_prompt_carries_fields_and_kind_params() {
        let provider = Arc::new(ScriptedProvider::new().reply("Systems beat skill. Done."));
        let generator = ContentGenerator::new(ContentKind::Medium, client(&provider), None)
            .with_phrase_picker(Arc::new(FixedPhrase(1)));

        let text = generator
            .generate("Metrics drift", "metrics", "translate_complexity", true)
            .await
            .unwrap();
        assert_eq!(text, "Systems beat skill. Done.");

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        let (prompt, params) = &calls[0];
        assert!(prompt.contains("Metrics drift"));
        assert!(prompt.contains("translate_complexity"));
        assert!(prompt.contains(SIGNATURE_PHRASES[1]));
        assert!(prompt.contains(NO_CONTEXT_AVAILABLE));
        assert_eq!(params.max_tokens, ContentKind::Medium.max_tokens());
        assert!((params.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(params.model, "test-model");
    }

    #[tokio::test]
    async fn test_rag_context_is_inserted() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(KnowledgeConfig {
            knowledge_dir: dir.path().join("docs"),
            vector_store_dir: dir.path().join("stores"),
            ..KnowledgeConfig::default()
        });
        store
            .build(Some(vec![Document::new(
                "notes.md",
                "Incentives create behavior in every sales team.",
            )]))
            .await
            .unwrap();

        let provider = Arc::new(ScriptedProvider::new().reply("ok").reply("ok"));
        let generator =
            ContentGenerator::new(ContentKind::Short, client(&provider), Some(Arc::new(store)));

        generator
            .generate("sales team incentives", "incentives", "diagnose_failure", true)
            .await
            .unwrap();
        generator
            .generate("sales team incentives", "incentives", "diagnose_failure", false)
            .await
            .unwrap();

        let calls = provider.calls();
        assert!(calls[0].0.contains("every sales team"));
        assert!(calls[1].0.contains(NO_CONTEXT_AVAILABLE));
        assert!(!calls[1].0.contains("every sales team"));
    }

    #[tokio::test]
    async fn test_empty_retrieval_uses_not_found_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(KnowledgeConfig {
            knowledge_dir: dir.path().join("missing"),
            vector_store_dir: dir.path().join("stores"),
            ..KnowledgeConfig::default()
        });
        let provider = Arc::new(ScriptedProvider::new().reply("ok"));
        let generator =
            ContentGenerator::new(ContentKind::Long, client(&provider), Some(Arc::new(store)));

        generator.generate("t", "metrics", "o", true).await.unwrap();
        assert!(provider.calls()[0].0.contains(NO_CONTEXT_FOUND));
    }

    #[tokio::test]
    async fn test_failure_is_wrapped_with_kind_label() {
        let provider = Arc::new(ScriptedProvider::new().fail(GenerationError::RateLimited));
        let generator = ContentGenerator::new(ContentKind::Short, client(&provider), None);

        let err = generator
            .generate("t", "incentives", "o", false)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Content { label: "LinkedIn post", .. }));
        assert_eq!(
            err.to_string(),
            "Error generating LinkedIn post: Rate limited by provider"
        );
    }

    #[tokio::test]
    async fn test_generate_request_counts_words() {
        let provider = Arc::new(ScriptedProvider::new().reply("one two three four"));
        let generator = ContentGenerator::new(ContentKind::Short, client(&provider), None);
        let request = GenerationRequest::new(ContentKind::Short, "t", "metrics", "o").without_rag();

        let content = generator.generate_request(&request).await.unwrap();
        assert_eq!(content.word_count, 4);
        assert_eq!(content.kind, ContentKind::Short);
    }

    #[test]
    fn test_phrase_pickers() {
        assert_eq!(FixedPhrase(4).pick(&SIGNATURE_PHRASES), SIGNATURE_PHRASES[1]);
        assert!(SIGNATURE_PHRASES.contains(&RandomPhrase.pick(&SIGNATURE_PHRASES)));

        let a: Vec<_> = (0..5)
            .map(|_| SeededPhrase::new(7).pick(&SIGNATURE_PHRASES))
            .collect();
        assert!(a.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(FixedPhrase(0).pick(&[]), "");
    }
}

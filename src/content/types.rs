//! Request and output types shared by generation and scheduling.

use super::ContentKind;

/// Number of whitespace-separated tokens.
///
/// The single word-count definition used at generation, validation and
/// batch-result time.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// One generation attempt's inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub topic: String,
    pub lens: String,
    pub objective: String,
    pub kind: ContentKind,
    pub use_rag: bool,
}

impl GenerationRequest {
    #[must_use]
    pub fn new(
        kind: ContentKind,
        topic: impl Into<String>,
        lens: impl Into<String>,
        objective: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            lens: lens.into(),
            objective: objective.into(),
            kind,
            use_rag: true,
        }
    }

    #[must_use]
    pub fn without_rag(mut self) -> Self {
        self.use_rag = false;
        self
    }
}

/// Raw generated text with its word count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContent {
    pub text: String,
    pub word_count: usize,
    pub kind: ContentKind,
}

impl GeneratedContent {
    #[must_use]
    pub fn new(text: String, kind: ContentKind) -> Self {
        Self {
            word_count: word_count(&text),
            text,
            kind,
        }
    }
}

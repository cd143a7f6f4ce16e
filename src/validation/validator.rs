//! LLM-backed quality scoring with deterministic penalties.

use serde::{Deserialize, Serialize};

use crate::ai::{format_validation_prompt, LlmClient};
use crate::config::MIN_SCORE;
use crate::content::word_count;

use super::rules::{apply_penalties, Penalty};
use super::score::parse_score;

const VALIDATION_TEMPERATURE: f32 = 0.3;
const VALIDATION_MAX_TOKENS: u32 = 1000;

/// Score, feedback and word count for one validation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub score: f64,
    pub feedback: String,
    pub word_count: usize,
}

/// Result of repeated validation of the same content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub passed: bool,
    pub score: f64,
    pub feedback: String,
    pub word_count: usize,
    pub attempts: u32,
}

/// Scores content against the rubric and decides pass/fail.
#[derive(Debug, Clone)]
pub struct QualityValidator {
    llm: LlmClient,
    min_score: f64,
}

impl QualityValidator {
    /// Create a validator with the default threshold.
    #[must_use]
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            min_score: MIN_SCORE,
        }
    }

    #[must_use]
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    #[must_use]
    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    /// Whether `score` meets the threshold.
    #[must_use]
    pub fn is_passing(&self, score: f64) -> bool {
        score >= self.min_score
    }

    /// Score `content`. Never fails: an LLM error becomes a zero score with
    /// the error in the feedback.
    pub async fn validate(
        &self,
        content: &str,
        kind_label: &str,
        target_words: &str,
    ) -> ValidationResult {
        let penalties = Penalty::detect(content);
        let word_count = word_count(content);
        let prompt = format_validation_prompt(content, kind_label, target_words, self.min_score);

        let mut feedback = match self
            .llm
            .complete(&prompt, VALIDATION_TEMPERATURE, VALIDATION_MAX_TOKENS)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, kind = kind_label, "Validation call failed");
                return ValidationResult {
                    score: 0.0,
                    feedback: format!("Error during validation: {e}"),
                    word_count,
                };
            }
        };

        let raw = parse_score(&feedback);
        let score = apply_penalties(raw, &mut feedback, &penalties);
        tracing::debug!(raw, score, word_count, ?penalties, "Validated content");

        ValidationResult {
            score,
            feedback,
            word_count,
        }
    }

    /// Re-validate the same content up to `max_retries` times, stopping at
    /// the first passing score.
    pub async fn validate_with_retry(
        &self,
        content: &str,
        kind_label: &str,
        target_words: &str,
        max_retries: u32,
    ) -> ValidationOutcome {
        let mut last = ValidationResult {
            score: 0.0,
            feedback: String::new(),
            word_count: word_count(content),
        };

        for attempt in 1..=max_retries {
            last = self.validate(content, kind_label, target_words).await;
            if self.is_passing(last.score) {
                return ValidationOutcome {
                    passed: true,
                    score: last.score,
                    feedback: last.feedback,
                    word_count: last.word_count,
                    attempts: attempt,
                };
            }
            tracing::debug!(attempt, score = last.score, "Validation below threshold");
        }

        ValidationOutcome {
            passed: false,
            score: last.score,
            feedback: last.feedback,
            word_count: last.word_count,
            attempts: max_retries,
        }
    }
}

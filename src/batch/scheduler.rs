//! Per-entry generate/validate/retry loop and batch driver.

use std::path::Path;

use chrono::Utc;

use crate::content::{CalendarEntry, CalendarStore, ContentGenerator, GeneratedContent};
use crate::display;
use crate::validation::{QualityValidator, ValidationResult};

use super::result::{export_results, passed_count, BatchError, BatchResult};

/// Content recorded when no attempt produced usable text.
pub const GENERATION_FAILED: &str = "Failed to generate content";

/// Default regeneration bound per entry.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// First post of the reference batch.
pub const REFERENCE_START: u32 = 4;

/// Last post of the reference batch.
pub const REFERENCE_END: u32 = 12;

/// Default artifact path for the reference batch.
pub const REFERENCE_OUTPUT: &str = "week_2_4_results.json";

/// One generated piece and its validation.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub content: GeneratedContent,
    pub validation: ValidationResult,
}

impl AttemptRecord {
    /// Whether this attempt should replace `best`. Requires a strictly
    /// greater score; with no best yet the baseline is 0.0.
    #[must_use]
    pub fn supersedes(&self, best: Option<&Self>) -> bool {
        self.validation.score > best.map_or(0.0, |b| b.validation.score)
    }
}

/// Running-maximum step of the retry loop.
#[must_use]
pub fn fold_attempt(best: Option<AttemptRecord>, attempt: AttemptRecord) -> Option<AttemptRecord> {
    if attempt.supersedes(best.as_ref()) {
        Some(attempt)
    } else {
        best
    }
}

/// Drives generation and validation over calendar entries.
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    generator: ContentGenerator,
    validator: QualityValidator,
    max_retries: u32,
    show_progress: bool,
}

impl BatchScheduler {
    #[must_use]
    pub fn new(generator: ContentGenerator, validator: QualityValidator) -> Self {
        Self {
            generator,
            validator,
            max_retries: DEFAULT_MAX_RETRIES,
            show_progress: true,
        }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Suppress terminal progress lines; tracing output is unaffected.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    async fn attempt(&self, entry: &CalendarEntry) -> Option<AttemptRecord> {
        let kind = self.generator.kind();
        let text = match self.generator.generate_from_calendar(entry).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(post_number = entry.post_number, error = %e, "Generation failed");
                if self.show_progress {
                    display::print_error(&e.to_string());
                }
                return None;
            }
        };

        let content = GeneratedContent::new(text, kind);
        let validation = self
            .validator
            .validate(&content.text, kind.label(), &kind.target_words())
            .await;
        Some(AttemptRecord { content, validation })
    }

    /// Generate and validate one entry, keeping the best attempt.
    ///
    /// Never fails: when every attempt errors the result carries
    /// [`GENERATION_FAILED`] with a zero score.
    pub async fn process_single(&self, entry: &CalendarEntry) -> BatchResult {
        if self.show_progress {
            display::print_post_start(entry.post_number, &entry.topic);
        }

        let mut best: Option<AttemptRecord> = None;
        let mut attempts = 0;

        for attempt in 1..=self.max_retries {
            attempts = attempt;
            if self.show_progress {
                display::print_attempt(attempt, self.max_retries);
            }

            let Some(record) = self.attempt(entry).await else {
                continue;
            };

            let score = record.validation.score;
            let passed = self.validator.is_passing(score);
            tracing::info!(
                post_number = entry.post_number,
                attempt,
                score,
                word_count = record.content.word_count,
                passed,
                "Attempt validated"
            );
            if self.show_progress {
                display::print_score(score, record.content.word_count);
                display::print_verdict(passed, score, self.validator.min_score());
            }

            best = fold_attempt(best, record);
            if passed {
                break;
            }
        }

        let mut result = BatchResult::for_entry(entry);
        result.attempts = attempts;
        if let Some(best) = best {
            result.content = best.content.text;
            result.word_count = best.content.word_count;
            result.score = best.validation.score;
            result.feedback = best.validation.feedback;
        } else {
            result.content = GENERATION_FAILED.to_string();
        }
        result.passed = self.validator.is_passing(result.score);
        result.timestamp = Utc::now();
        result
    }

    /// Process entries with `start <= post_number <= end`, in post order.
    pub async fn process_batch(
        &self,
        calendar: &CalendarStore,
        start: u32,
        end: u32,
    ) -> Vec<BatchResult> {
        let selected = calendar.range(start, end);

        tracing::info!(start, end, posts = selected.len(), "Starting batch");
        if self.show_progress {
            display::print_batch_start(start, end, selected.len());
        }

        let mut results = Vec::with_capacity(selected.len());
        for entry in &selected {
            results.push(self.process_single(entry).await);
        }

        let passed = passed_count(&results);
        tracing::info!(passed, total = results.len(), "Batch complete");
        if self.show_progress {
            display::print_batch_summary(passed, results.len());
        }
        results
    }

    /// Run posts 4-12 of the reference calendar and export them to `path`.
    ///
    /// # Errors
    ///
    /// Returns `BatchError` if the results cannot be written.
    pub async fn run_reference_batch(&self, path: &Path) -> Result<Vec<BatchResult>, BatchError> {
        let calendar = CalendarStore::reference();
        let results = self
            .process_batch(&calendar, REFERENCE_START, REFERENCE_END)
            .await;
        export_results(&results, path).await?;
        Ok(results)
    }
}

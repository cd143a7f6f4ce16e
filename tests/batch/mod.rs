//! Batch scheduler tests.

mod export_test;
mod scheduler_test;

use std::sync::Arc;
use std::time::Duration;

use content_agent::ai::{LlmClient, ScriptedProvider};
use content_agent::batch::BatchScheduler;
use content_agent::content::{ContentGenerator, ContentKind, FixedPhrase};
use content_agent::validation::QualityValidator;

/// Scheduler with separate scripted providers for generation and judging.
pub(crate) fn scheduler(
    writer: ScriptedProvider,
    judge: ScriptedProvider,
) -> (BatchScheduler, Arc<ScriptedProvider>, Arc<ScriptedProvider>) {
    let writer = Arc::new(writer);
    let judge = Arc::new(judge);
    let generator = ContentGenerator::new(
        ContentKind::Short,
        LlmClient::new(writer.clone(), "writer", Duration::from_secs(5)),
        None,
    )
    .with_phrase_picker(Arc::new(FixedPhrase(0)));
    let validator =
        QualityValidator::new(LlmClient::new(judge.clone(), "judge", Duration::from_secs(5)));
    let scheduler = BatchScheduler::new(generator, validator).quiet();
    (scheduler, writer, judge)
}

//! Retry loop and batch ordering.

use content_agent::ai::{GenerationError, ScriptedProvider};
use content_agent::batch::GENERATION_FAILED;
use content_agent::content::{word_count, CalendarStore};

use super::scheduler;

#[tokio::test]
async fn test_keeps_best_of_three_attempts() {
    let (scheduler, writer, judge) = scheduler(
        ScriptedProvider::new()
            .reply("first draft")
            .reply("second draft is the keeper")
            .reply("third"),
        ScriptedProvider::new()
            .reply("SCORE: 6.5")
            .reply("SCORE: 7.5")
            .reply("SCORE: 7.0"),
    );
    let calendar = CalendarStore::reference();
    let entry = calendar.get(4).unwrap();

    let result = scheduler.process_single(entry).await;

    assert_eq!(writer.call_count(), 3);
    assert_eq!(judge.call_count(), 3);
    assert_eq!(result.attempts, 3);
    assert_eq!(result.content, "second draft is the keeper");
    assert!((result.score - 7.5).abs() < f64::EPSILON);
    assert_eq!(result.feedback, "SCORE: 7.5");
    assert!(!result.passed);
    assert_eq!(result.word_count, word_count("second draft is the keeper"));
    assert_eq!(result.post_number, 4);
    assert_eq!(result.topic, entry.topic);
}

#[tokio::test]
async fn test_stops_at_first_pass() {
    let (scheduler, writer, _judge) = scheduler(
        ScriptedProvider::new().reply("meh").reply("Systems beat skill."),
        ScriptedProvider::new().reply("SCORE: 5").reply("SCORE: 8.0"),
    );
    let calendar = CalendarStore::reference();

    let result = scheduler.process_single(calendar.get(5).unwrap()).await;

    assert!(result.passed);
    assert_eq!(result.attempts, 2);
    assert_eq!(result.content, "Systems beat skill.");
    assert_eq!(writer.call_count(), 2);
}

#[tokio::test]
async fn test_tie_keeps_earlier_attempt() {
    let (scheduler, _writer, _judge) = scheduler(
        ScriptedProvider::new().reply("earlier").reply("later"),
        ScriptedProvider::new().reply("SCORE: 7").reply("SCORE: 7"),
    );
    let scheduler = scheduler.with_max_retries(2);
    let calendar = CalendarStore::reference();

    let result = scheduler.process_single(calendar.get(6).unwrap()).await;
    assert_eq!(result.content, "earlier");
    assert_eq!(result.attempts, 2);
}

#[tokio::test]
async fn test_all_generation_failures_yield_sentinel() {
    let (scheduler, writer, judge) = scheduler(
        ScriptedProvider::new()
            .fail(GenerationError::Timeout)
            .fail(GenerationError::RateLimited)
            .fail(GenerationError::RequestFailed("503".to_string())),
        ScriptedProvider::new(),
    );
    let calendar = CalendarStore::reference();

    let result = scheduler.process_single(calendar.get(7).unwrap()).await;

    assert_eq!(result.content, GENERATION_FAILED);
    assert!(result.score.abs() < f64::EPSILON);
    assert!(!result.passed);
    assert_eq!(result.word_count, 0);
    assert_eq!(result.attempts, 3);
    assert!(result.feedback.is_empty());
    assert_eq!(writer.call_count(), 3);
    assert_eq!(judge.call_count(), 0);
}

#[tokio::test]
async fn test_generation_error_then_success() {
    let (scheduler, _writer, _judge) = scheduler(
        ScriptedProvider::new()
            .fail(GenerationError::Timeout)
            .reply("recovered text"),
        ScriptedProvider::new().reply("SCORE: 9"),
    );
    let calendar = CalendarStore::reference();

    let result = scheduler.process_single(calendar.get(8).unwrap()).await;
    assert!(result.passed);
    assert_eq!(result.attempts, 2);
    assert_eq!(result.content, "recovered text");
}

#[tokio::test]
async fn test_validation_failure_scores_zero_and_is_not_retained() {
    let (scheduler, _writer, _judge) = scheduler(
        ScriptedProvider::new().reply("only draft"),
        ScriptedProvider::new().fail(GenerationError::Timeout),
    );
    let scheduler = scheduler.with_max_retries(1);
    let calendar = CalendarStore::reference();

    let result = scheduler.process_single(calendar.get(9).unwrap()).await;
    assert_eq!(result.content, GENERATION_FAILED);
    assert_eq!(result.attempts, 1);
    assert!(!result.passed);
}

#[tokio::test]
async fn test_zero_retries_makes_no_calls() {
    let (scheduler, writer, _judge) =
        scheduler(ScriptedProvider::new(), ScriptedProvider::new());
    let scheduler = scheduler.with_max_retries(0);
    let calendar = CalendarStore::reference();

    let result = scheduler.process_single(calendar.get(10).unwrap()).await;
    assert_eq!(result.attempts, 0);
    assert_eq!(result.content, GENERATION_FAILED);
    assert_eq!(writer.call_count(), 0);
}

#[tokio::test]
async fn test_process_batch_filters_range_in_order() {
    let (scheduler, writer, _judge) = scheduler(
        ScriptedProvider::new().with_fallback("A steady draft."),
        ScriptedProvider::new().with_fallback("SCORE: 9"),
    );
    let mut shuffled = CalendarStore::reference().entries().to_vec();
    shuffled.reverse();
    let calendar = CalendarStore::new(shuffled).unwrap();

    let results = scheduler.process_batch(&calendar, 5, 7).await;

    let numbers: Vec<u32> = results.iter().map(|r| r.post_number).collect();
    assert_eq!(numbers, vec![5, 6, 7]);
    assert!(results.iter().all(|r| r.passed && r.attempts == 1));

    let prompts = writer.calls();
    assert!(prompts[0].0.contains(&calendar.get(5).unwrap().topic));
    assert!(prompts[2].0.contains(&calendar.get(7).unwrap().topic));
}

#[tokio::test]
async fn test_process_batch_empty_range() {
    let (scheduler, writer, _judge) =
        scheduler(ScriptedProvider::new(), ScriptedProvider::new());
    let calendar = CalendarStore::reference();

    assert!(scheduler.process_batch(&calendar, 20, 30).await.is_empty());
    assert_eq!(writer.call_count(), 0);
}

#[tokio::test]
async fn test_batch_prompts_request_linkedin_validation() {
    let (scheduler, _writer, judge) = scheduler(
        ScriptedProvider::new().with_fallback("draft"),
        ScriptedProvider::new().with_fallback("SCORE: 10"),
    );
    let calendar = CalendarStore::reference();
    scheduler.process_batch(&calendar, 12, 12).await;

    let (prompt, params) = &judge.calls()[0];
    assert!(prompt.contains("Content Type: LinkedIn"));
    assert!(prompt.contains("150-250"));
    assert_eq!(params.max_tokens, 1000);
}

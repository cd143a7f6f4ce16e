//! Reference batch run and JSON artifact.

use content_agent::ai::ScriptedProvider;
use content_agent::batch::{load_results, passed_count, DEFAULT_MAX_RETRIES};
use content_agent::content::{Lens, Objective};

use super::scheduler;

#[tokio::test]
async fn test_reference_batch_exports_posts_4_to_12() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("week_2_4_results.json");
    let (scheduler, _writer, _judge) = scheduler(
        ScriptedProvider::new().with_fallback("Incentives create behavior. Every time."),
        ScriptedProvider::new().with_fallback("SCORE: 8.5\nFEEDBACK: solid"),
    );

    let results = scheduler.run_reference_batch(&path).await.unwrap();
    assert_eq!(results.len(), 9);
    assert_eq!(passed_count(&results), 9);

    let loaded = load_results(&path).await.unwrap();
    assert_eq!(loaded, results);
    assert_eq!(loaded[0].post_number, 4);
    assert_eq!(loaded[0].lens, Lens::Processes);
    assert_eq!(loaded[0].objective, Objective::DiagnoseFailure);
    assert_eq!(loaded[8].post_number, 12);
    assert_eq!(loaded[8].word_count, 5);
}

#[tokio::test]
async fn test_artifact_is_pretty_json_with_expected_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    let (scheduler, _writer, _judge) = scheduler(
        ScriptedProvider::new().with_fallback("draft"),
        ScriptedProvider::new().with_fallback("SCORE: 3"),
    );
    scheduler.run_reference_batch(&path).await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with("[\n"));
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &value[0];
    for field in [
        "post_number",
        "week",
        "topic",
        "lens",
        "objective",
        "content",
        "score",
        "feedback",
        "attempts",
        "passed",
        "word_count",
        "timestamp",
    ] {
        assert!(first.get(field).is_some(), "missing field {field}");
    }
    assert_eq!(first["passed"], false);
    assert_eq!(first["attempts"], DEFAULT_MAX_RETRIES);
    assert!(first.get("description").is_none());
}

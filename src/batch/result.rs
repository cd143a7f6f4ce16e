//! Batch result records and their JSON artifact.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::content::{CalendarEntry, Lens, Objective};

/// Errors from reading or writing the batch artifact.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Outcome of processing one calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub post_number: u32,
    pub week: u32,
    pub topic: String,
    pub lens: Lens,
    pub objective: Objective,
    pub content: String,
    pub score: f64,
    pub feedback: String,
    pub attempts: u32,
    pub passed: bool,
    pub word_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl BatchResult {
    /// Record for `entry` with the remaining fields filled in by the caller.
    #[must_use]
    pub fn for_entry(entry: &CalendarEntry) -> Self {
        Self {
            post_number: entry.post_number,
            week: entry.week,
            topic: entry.topic.clone(),
            lens: entry.lens,
            objective: entry.objective,
            content: String::new(),
            score: 0.0,
            feedback: String::new(),
            attempts: 0,
            passed: false,
            word_count: 0,
            timestamp: Utc::now(),
        }
    }
}

/// Number of passing results.
#[must_use]
pub fn passed_count(results: &[BatchResult]) -> usize {
    results.iter().filter(|r| r.passed).count()
}

/// Write results as pretty JSON, atomically (temp file + sync + rename).
///
/// # Errors
///
/// Returns `BatchError` if serialization or any file operation fails.
pub async fn export_results(results: &[BatchResult], path: &Path) -> Result<(), BatchError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(results)?;
    let temp_path = path.with_extension("json.tmp");
    let mut file = tokio::fs::File::create(&temp_path).await?;
    file.write_all(json.as_bytes()).await?;
    file.sync_data().await?;
    drop(file);

    tokio::fs::rename(&temp_path, path).await?;
    tracing::info!(path = %path.display(), results = results.len(), "Exported batch results");
    Ok(())
}

/// Read a previously exported artifact.
///
/// # Errors
///
/// Returns `BatchError` if the file cannot be read or parsed.
pub async fn load_results(path: &Path) -> Result<Vec<BatchResult>, BatchError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

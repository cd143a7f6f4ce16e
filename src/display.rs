//! Colored CLI display utilities for pipeline progress.
//!
//! Lines follow a `<timestamp> [TAG] message` layout so they interleave
//! cleanly with tracing output.

use std::io::{self, Write};

use chrono::Utc;
use owo_colors::OwoColorize;

use crate::batch::BatchResult;
use crate::content::CalendarEntry;

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Truncate a string to at most `max_len` characters, adding an ellipsis if
/// truncated.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}

fn flush() {
    let _ = io::stdout().flush();
}

/// Print the start of a batch run.
pub fn print_batch_start(start: u32, end: u32, posts: usize) {
    println!(
        "{} {} Posts {}-{} ({} posts)",
        timestamp().dimmed(),
        "[BATCH]".blue().bold(),
        start,
        end,
        posts
    );
    flush();
}

/// Print the pass count at the end of a batch run.
pub fn print_batch_summary(passed: usize, total: usize) {
    let tag = if passed == total {
        "[BATCH]".green().bold().to_string()
    } else {
        "[BATCH]".yellow().bold().to_string()
    };
    println!(
        "{} {} Complete: {}/{} posts passed validation",
        timestamp().dimmed(),
        tag,
        passed,
        total
    );
    flush();
}

/// Print the entry being generated.
pub fn print_post_start(post_number: u32, topic: &str) {
    println!(
        "{} {} #{} {}",
        timestamp().dimmed(),
        "[POST]".cyan().bold(),
        post_number,
        truncate(topic, 80).bold()
    );
    flush();
}

/// Print an attempt counter.
pub fn print_attempt(attempt: u32, max: u32) {
    println!("  {} {}/{}...", "[ATTEMPT]".dimmed(), attempt, max);
    flush();
}

/// Print a validation score and word count.
pub fn print_score(score: f64, word_count: usize) {
    println!(
        "  {} {:.1} | Words: {}",
        "[SCORE]".magenta().bold(),
        score,
        word_count
    );
    flush();
}

/// Print the pass/fail decision for one attempt.
pub fn print_verdict(passed: bool, score: f64, min_score: f64) {
    if passed {
        println!(
            "  {} Passed validation (score: {:.1})",
            "[PASS]".green().bold(),
            score
        );
    } else {
        println!(
            "  {} Failed validation (score: {:.1} < {:.1})",
            "[FAIL]".red().bold(),
            score,
            min_score
        );
    }
    flush();
}

/// Print an error line.
pub fn print_error(message: &str) {
    println!("  {} {}", "[ERROR]".red().bold(), truncate(message, 200).red());
    flush();
}

/// Print an informational line.
pub fn print_info(message: &str) {
    println!(
        "{} {} {}",
        timestamp().dimmed(),
        "[INFO]".blue().bold(),
        message
    );
    flush();
}

/// Print generated text as-is.
pub fn print_text(text: &str) {
    println!("{text}");
    flush();
}

/// Print one line per batch result.
pub fn print_results(results: &[BatchResult]) {
    for result in results {
        let status = if result.passed {
            "[PASSED]".green().bold().to_string()
        } else {
            "[FAILED]".red().bold().to_string()
        };
        println!(
            "Post {}: {} (Score: {:.1}, attempts: {})",
            result.post_number, status, result.score, result.attempts
        );
    }
    flush();
}

/// Print calendar entries as a table.
pub fn print_calendar(entries: &[CalendarEntry]) {
    for entry in entries {
        println!(
            "{:>3}  {}  {:<12} {:<22} {}",
            entry.post_number.bold(),
            format!("week {}", entry.week).dimmed(),
            entry.lens.cyan(),
            entry.objective.magenta(),
            entry.topic
        );
    }
    flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("naïve café culture", 8), "naïve...");
    }

    #[test]
    fn test_truncate_tiny_limit() {
        assert_eq!(truncate("hello", 2), "...");
    }
}

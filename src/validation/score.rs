//! Extraction of the numeric score from a validator response.

use std::sync::OnceLock;

use regex::Regex;

use super::rules::clamp_score;

fn score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"SCORE:\s*(\d+\.?\d*)").expect("score pattern is valid"))
}

/// Parse the first `SCORE: <number>` line, clamped to [0, 10].
///
/// A missing or unparsable score yields 0.0.
#[must_use]
pub fn parse_score(response: &str) -> f64 {
    score_pattern()
        .captures(response)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map_or(0.0, clamp_score)
}

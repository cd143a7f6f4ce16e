//! Deterministic content checks applied on top of the LLM score.

/// Lowest possible score.
pub const MIN_POSSIBLE_SCORE: f64 = 0.0;

/// Highest possible score.
pub const MAX_POSSIBLE_SCORE: f64 = 10.0;

/// Code point ranges treated as emoji: pictographs, emoticons, transport
/// symbols and miscellaneous symbols/dingbats.
const EMOJI_RANGES: [(u32, u32); 4] = [
    (0x1F300, 0x1F9FF),
    (0x1F600, 0x1F64F),
    (0x1F680, 0x1F6FF),
    (0x2600, 0x27BF),
];

/// Whether `c` falls in one of the emoji ranges.
#[must_use]
pub fn is_emoji(c: char) -> bool {
    let cp = u32::from(c);
    EMOJI_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

#[must_use]
pub fn contains_emoji(content: &str) -> bool {
    content.chars().any(is_emoji)
}

/// Whether the content, ignoring surrounding whitespace, ends with `?`.
#[must_use]
pub fn ends_with_question(content: &str) -> bool {
    content.trim().ends_with('?')
}

/// Deduction for a banned stylistic element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Penalty {
    /// Content contains emoji.
    Emoji,
    /// Content ends with a question.
    TrailingQuestion,
}

impl Penalty {
    /// Points deducted from the score.
    #[must_use]
    pub fn amount(self) -> f64 {
        match self {
            Self::Emoji => 2.0,
            Self::TrailingQuestion => 1.0,
        }
    }

    /// Line appended to the feedback when the penalty applies.
    #[must_use]
    pub fn annotation(self) -> &'static str {
        match self {
            Self::Emoji => "\n- PENALTY: Contains emojis (-2.0)",
            Self::TrailingQuestion => "\n- PENALTY: Ends with question (-1.0)",
        }
    }

    /// Penalties that apply to `content`, in application order.
    #[must_use]
    pub fn detect(content: &str) -> Vec<Self> {
        let mut found = Vec::new();
        if contains_emoji(content) {
            found.push(Self::Emoji);
        }
        if ends_with_question(content) {
            found.push(Self::TrailingQuestion);
        }
        found
    }
}

/// Clamp a raw score into the valid range.
#[must_use]
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(MIN_POSSIBLE_SCORE, MAX_POSSIBLE_SCORE)
}

/// Apply penalties in order, flooring at zero after each and annotating the
/// feedback.
#[must_use]
pub fn apply_penalties(mut score: f64, feedback: &mut String, penalties: &[Penalty]) -> f64 {
    for penalty in penalties {
        score = (score - penalty.amount()).max(MIN_POSSIBLE_SCORE);
        feedback.push_str(penalty.annotation());
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_detection() {
        assert!(contains_emoji("Ship it 🚀"));
        assert!(contains_emoji("Sunny ☀ day"));
        assert!(contains_emoji("😀"));
        assert!(!contains_emoji("Systems beat skill."));
        assert!(!contains_emoji("Résumé — naïve café"));
    }

    #[test]
    fn test_trailing_question_ignores_whitespace() {
        assert!(ends_with_question("Why do teams fail?"));
        assert!(ends_with_question("Why do teams fail?  \n"));
        assert!(!ends_with_question("Why? Because incentives."));
    }

    #[test]
    fn test_detect_order() {
        assert_eq!(
            Penalty::detect("Really 🙃?"),
            vec![Penalty::Emoji, Penalty::TrailingQuestion]
        );
        assert!(Penalty::detect("Plain statement.").is_empty());
    }

    #[test]
    fn test_emoji_penalty_floors_at_zero() {
        let mut feedback = String::new();
        let score = apply_penalties(1.0, &mut feedback, &[Penalty::Emoji]);
        assert!(score.abs() < f64::EPSILON);
        assert_eq!(feedback, "\n- PENALTY: Contains emojis (-2.0)");
    }

    #[test]
    fn test_penalties_are_additive() {
        let mut feedback = "SCORE: 9".to_string();
        let score = apply_penalties(
            9.0,
            &mut feedback,
            &[Penalty::Emoji, Penalty::TrailingQuestion],
        );
        assert!((score - 6.0).abs() < f64::EPSILON);
        assert!(feedback.ends_with("(-2.0)\n- PENALTY: Ends with question (-1.0)"));
    }

    #[test]
    fn test_clamp_score() {
        assert!((clamp_score(12.5) - 10.0).abs() < f64::EPSILON);
        assert!(clamp_score(-3.0).abs() < f64::EPSILON);
        assert!((clamp_score(7.25) - 7.25).abs() < f64::EPSILON);
    }
}

//! Content kinds and their generation parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ai::{ARTICLE_PROMPT, BLOG_PROMPT, LINKEDIN_PROMPT};

/// Output length class. Determines template, word band, retrieval depth and
/// output budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// LinkedIn post.
    Short,
    /// Blog post.
    Medium,
    /// Long-form article.
    Long,
}

impl ContentKind {
    pub const ALL: [Self; 3] = [Self::Short, Self::Medium, Self::Long];

    /// Label passed to the validator as the content type.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Short => "LinkedIn",
            Self::Medium => "Blog",
            Self::Long => "Article",
        }
    }

    /// Human-readable noun used in error messages.
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            Self::Short => "LinkedIn post",
            Self::Medium => "blog post",
            Self::Long => "article",
        }
    }

    /// Inclusive target word band.
    #[must_use]
    pub fn word_range(self) -> (usize, usize) {
        match self {
            Self::Short => (150, 250),
            Self::Medium => (800, 1500),
            Self::Long => (1000, 2000),
        }
    }

    /// Target word band as shown to the validator, e.g. `150-250`.
    #[must_use]
    pub fn target_words(self) -> String {
        let (lo, hi) = self.word_range();
        format!("{lo}-{hi}")
    }

    /// Number of chunks retrieved for context.
    #[must_use]
    pub fn retrieval_depth(self) -> usize {
        match self {
            Self::Short => 3,
            Self::Medium => 5,
            Self::Long => 7,
        }
    }

    #[must_use]
    pub fn temperature(self) -> f32 {
        0.7
    }

    /// Output token budget for the generation call.
    #[must_use]
    pub fn max_tokens(self) -> u32 {
        match self {
            Self::Short => 1000,
            Self::Medium => 2500,
            Self::Long => 3000,
        }
    }

    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            Self::Short => LINKEDIN_PROMPT,
            Self::Medium => BLOG_PROMPT,
            Self::Long => ARTICLE_PROMPT,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized content kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown content kind '{0}' (expected short, medium or long)")]
pub struct UnknownKindError(pub String);

impl FromStr for ContentKind {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" | "linkedin" => Ok(Self::Short),
            "medium" | "blog" => Ok(Self::Medium),
            "long" | "article" => Ok(Self::Long),
            _ => Err(UnknownKindError(s.to_string())),
        }
    }
}

//! Prompt templates for generation and validation.
//!
//! Templates use `{name}` placeholders. Each template is filled in a single
//! scan, so substituted values are never rescanned and placeholder-like text
//! in a topic, retrieved context or validated content is left alone.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Core thesis woven into every generation prompt.
pub const CORE_THESIS: &str = "Systems beat skill. Incentives, processes, constraints, narratives, \
feedback loops, and metrics shape behavior more than individual capability.";

/// Phrases a generated piece should use at least once.
pub const SIGNATURE_PHRASES: [&str; 3] = [
    "Systems beat skill",
    "Incentives create behavior",
    "Execution is a design problem",
];

const VOICE_GUIDELINES: &str = "Voice Guidelines:
- Clear, slightly contrarian, calm, practical
- Grounded in lived experience
- NO motivational language, buzzwords, or emojis
- Short paragraphs (1-2 lines)
- Declarative statements";

/// Short-form (LinkedIn) post template.
pub const LINKEDIN_PROMPT: &str = r"You are an expert content creator generating LinkedIn posts.

Core Thesis: {core_thesis}

{voice}
- NO questions at the end and NO calls to action

Content Framework:
Topic: {topic}
Primary Lens: {lens}
Objective: {objective}

Relevant Context from Knowledge Base:
{context}

Write a LinkedIn post (150-250 words) that:
1. Opens with a contrarian or surprising statement
2. Analyzes the topic through the {lens} lens
3. Grounds insights in specific, practical examples
4. Achieves the {objective} objective
5. Uses this signature phrase naturally: {signature_phrase}
6. Ends with a declarative insight (no questions, no CTAs)

Word count: 150-250 words
Format: Short paragraphs, no emojis, no hashtags";

/// Medium-form (blog) post template.
pub const BLOG_PROMPT: &str = r"You are an expert content creator generating blog posts.

Core Thesis: {core_thesis}

{voice}

Content Framework:
Topic: {topic}
Primary Lens: {lens}
Objective: {objective}

Relevant Context from Knowledge Base:
{context}

Write a blog post (800-1500 words) that:
1. Opens with a hook that challenges conventional wisdom
2. Analyzes the topic primarily through the {lens} lens, touching on others
3. Provides concrete examples and practical insights
4. Keeps the systems-thinking perspective throughout
5. Has 3-4 main sections with subheadings
6. Uses this signature phrase naturally: {signature_phrase}
7. Ends with actionable insights

Word count: 800-1500 words
Format: Structured sections, short paragraphs, no emojis";

/// Long-form article template.
pub const ARTICLE_PROMPT: &str = r"You are an expert content creator generating in-depth articles.

Core Thesis: {core_thesis}

{voice}

Content Framework:
Topic: {topic}
Primary Lens: {lens}
Objective: {objective}

Relevant Context from Knowledge Base:
{context}

Write an article (1000-2000 words) that:
1. Opens with a deep insight that reframes the topic
2. Works systematically through multiple lenses, starting with {lens}
3. Weaves in specific examples and case studies
4. Explores second-order effects and system dynamics
5. Has 4-6 main sections with subheadings
6. Uses this signature phrase naturally: {signature_phrase}
7. Ends with synthesis and practical implications

Word count: 1000-2000 words
Format: Well-structured sections, short paragraphs, analytical depth";

/// Rubric prompt for the validator.
pub const VALIDATION_PROMPT: &str = r"You are a content quality validator. Evaluate this content on a 0-10 scale.

Content Type: {content_type}
Target Word Count: {target_words}

Evaluation Criteria:
1. Word Count (meets target range)
2. Voice Compliance (clear, contrarian, calm, practical)
3. No Banned Elements (emojis, CTAs, questions at end, buzzwords, motivational language)
4. Systems Thinking (reflects the thesis that systems beat skill)
5. Practical Grounding (specific examples, lived experience)
6. Insight Quality (contrarian, actionable, well-supported)
7. Paragraph Structure (short, 1-2 lines)
8. Declarative Style (avoids questions, especially at the end)

Provide a score (0-10) and brief feedback on each criterion.

Format your response as:
SCORE: [number]
WORD_COUNT: [actual count]
FEEDBACK:
- Criterion 1: [feedback]
- Criterion 2: [feedback]
...

Minimum passing score: {min_score}

Content to Validate:
{content}";

/// Values substituted into a generation template.
#[derive(Debug, Clone, Copy)]
pub struct PromptFields<'a> {
    pub topic: &'a str,
    pub lens: &'a str,
    pub objective: &'a str,
    pub context: &'a str,
    pub signature_phrase: &'a str,
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"))
}

/// Replace every known placeholder in one pass. Unknown names are kept.
fn fill<'a>(template: &str, value: impl Fn(&str) -> Option<&'a str>) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures<'_>| {
            value(&caps[1]).map_or_else(|| caps[0].to_string(), str::to_string)
        })
        .into_owned()
}

/// Fill a generation template.
#[must_use]
pub fn format_generation_prompt(template: &str, fields: &PromptFields<'_>) -> String {
    fill(template, |name| match name {
        "voice" => Some(VOICE_GUIDELINES),
        "core_thesis" => Some(CORE_THESIS),
        "topic" => Some(fields.topic),
        "lens" => Some(fields.lens),
        "objective" => Some(fields.objective),
        "signature_phrase" => Some(fields.signature_phrase),
        "context" => Some(fields.context),
        _ => None,
    })
}

/// Fill the validation rubric.
#[must_use]
pub fn format_validation_prompt(
    content: &str,
    content_type: &str,
    target_words: &str,
    min_score: f64,
) -> String {
    let min_score = format!("{min_score:.1}");
    fill(VALIDATION_PROMPT, |name| match name {
        "content_type" => Some(content_type),
        "target_words" => Some(target_words),
        "min_score" => Some(min_score.as_str()),
        "content" => Some(content),
        _ => None,
    })
}

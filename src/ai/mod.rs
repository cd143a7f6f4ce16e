//! LLM client module: providers, prompt templates, and a scripted test double.

mod client;
mod mock;
mod prompts;

pub use client::*;
pub use mock::ScriptedProvider;
pub use prompts::{
    format_generation_prompt, format_validation_prompt, PromptFields, ARTICLE_PROMPT, BLOG_PROMPT,
    CORE_THESIS, LINKEDIN_PROMPT, SIGNATURE_PHRASES, VALIDATION_PROMPT,
};

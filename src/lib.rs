//! Content Agent - retrieval-augmented, quality-gated content generation.

pub mod ai;
pub mod batch;
pub mod commands;
pub mod config;
pub mod content;
pub mod display;
pub mod knowledge;
pub mod validation;

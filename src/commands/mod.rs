//! Command implementations behind the CLI.

mod pipeline;

pub use pipeline::*;

//! Batch scheduling over the content calendar and the JSON result artifact.

mod result;
mod scheduler;

pub use result::*;
pub use scheduler::*;

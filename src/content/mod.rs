//! Content kinds, the content calendar and the generator.

mod calendar;
mod generator;
mod kind;
mod types;

pub use calendar::*;
pub use generator::*;
pub use kind::*;
pub use types::*;

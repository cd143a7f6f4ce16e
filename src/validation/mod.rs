//! Quality validation: rubric scoring, penalties and the pass threshold.

mod rules;
mod score;
mod validator;

pub use rules::*;
pub use score::parse_score;
pub use validator::*;

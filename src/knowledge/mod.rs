//! Knowledge layer for retrieval-augmented generation.
//!
//! - `documents`: loading `.md`/`.txt` sources and chunking them
//! - `index`: lexical similarity index with JSON persistence
//! - `store`: lazily initialized store answering context queries

mod documents;
mod index;
mod source;
mod store;

pub use documents::*;
pub use index::*;
pub use source::*;
pub use store::*;

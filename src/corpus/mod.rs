//! Corpus: content entry types, loading, and the per-build content store.

pub mod error;
pub mod frontmatter;
pub mod loader;
pub mod store;
pub mod types;

pub use error::CorpusError;
pub use loader::{load_corpus, slugify};
pub use store::{AllContent, ContentStore};
pub use types::{Backlink, ContentEntry, EntryKind, Essay, FieldNote, ShelfEntry, Source};

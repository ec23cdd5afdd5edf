//! Corpus loading and validation errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling the content store.
///
/// Reference sparsity (an unresolvable `related` slug, a missing mention)
/// is never an error; only contract violations land here.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("`{0}`: missing front matter fence (`---`)")]
    MissingFrontMatter(PathBuf),

    #[error("`{0}`: front matter parsing error")]
    FrontMatter(PathBuf, #[source] serde_yaml::Error),

    #[error("{0} has an empty slug")]
    EmptySlug(String),

    #[error("duplicate slug `{0}` (in `{1}` and `{2}`)")]
    DuplicateSlug(String, String, String),
}

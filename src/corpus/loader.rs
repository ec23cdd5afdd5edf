//! Corpus loading from a content directory.
//!
//! Layout mirrors the site's collections:
//!
//! ```text
//! content/
//!   essays/*.md      long-form essays
//!   notes/*.md       field notes
//!   shelf/*.md       reference shelf entries
//! ```
//!
//! Loading is a pure function of the directory contents: no network, no
//! mutation, deterministic for identical trees (files are visited in
//! sorted order).

use std::fs;
use std::path::Path;

use deunicode::deunicode;
use serde::de::DeserializeOwned;
use walkdir::WalkDir;

use super::error::CorpusError;
use super::frontmatter::parse_document;
use super::store::ContentStore;
use super::types::{Essay, FieldNote, ShelfEntry};

/// Collection subdirectories under the content root.
const ESSAYS_DIR: &str = "essays";
const NOTES_DIR: &str = "notes";
const SHELF_DIR: &str = "shelf";

/// Load the full corpus from a content directory and assemble the store.
///
/// Missing collection directories are treated as empty collections, not
/// errors: a site with no shelf is still a site.
pub fn load_corpus(content_dir: &Path) -> Result<ContentStore, CorpusError> {
    let essays = load_collection(&content_dir.join(ESSAYS_DIR), |e: &mut Essay, stem| {
        default_slug(&mut e.slug, stem);
    })?;
    let field_notes = load_collection(&content_dir.join(NOTES_DIR), |n: &mut FieldNote, stem| {
        default_slug(&mut n.slug, stem);
    })?;
    let shelf = load_collection(&content_dir.join(SHELF_DIR), |s: &mut ShelfEntry, stem| {
        default_slug(&mut s.slug, stem);
    })?;

    ContentStore::new(essays, field_notes, shelf)
}

/// Load one collection directory of markdown files.
fn load_collection<T, F>(dir: &Path, mut finish: F) -> Result<Vec<T>, CorpusError>
where
    T: DeserializeOwned + HasBody,
    F: FnMut(&mut T, &str),
{
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
    {
        let path = entry.path();
        let raw =
            fs::read_to_string(path).map_err(|e| CorpusError::Io(path.to_path_buf(), e))?;
        let (mut meta, body): (T, String) = parse_document(path, &raw)?;
        meta.set_body(body);

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        finish(&mut meta, &stem);
        entries.push(meta);
    }
    Ok(entries)
}

/// Small seam so `load_collection` can attach the markdown body generically.
trait HasBody {
    fn set_body(&mut self, body: String);
}

impl HasBody for Essay {
    fn set_body(&mut self, body: String) {
        self.body = body;
    }
}

impl HasBody for FieldNote {
    fn set_body(&mut self, body: String) {
        self.body = body;
    }
}

impl HasBody for ShelfEntry {
    fn set_body(&mut self, body: String) {
        self.body = body;
    }
}

/// Fill an empty slug from the file stem.
fn default_slug(slug: &mut String, stem: &str) {
    if slug.trim().is_empty() {
        *slug = slugify(stem);
    }
}

/// Convert arbitrary text to a URL-safe slug.
///
/// ASCII-folds unicode, lowercases, and collapses non-alphanumeric runs
/// to single hyphens.
pub fn slugify(text: &str) -> String {
    let folded = deunicode(text).to_ascii_lowercase();
    let mut slug = String::with_capacity(folded.len());
    let mut pending_sep = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c);
        } else {
            pending_sep = true;
        }
    }
    slug
}

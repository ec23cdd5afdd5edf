//! Content store: the corpus snapshot the engine runs against.
//!
//! The store is built once per build invocation and passed by reference
//! into the engine. There is no process-wide cache: every invocation sees
//! exactly the snapshot it was given, which keeps per-essay runs
//! independent and order-insensitive when the host parallelizes them.

use rustc_hash::FxHashMap;

use super::error::CorpusError;
use super::types::{ContentEntry, Essay, FieldNote, ShelfEntry};

/// Borrowed view over the three collections, exactly what the engine
/// consumes for one scoring run.
#[derive(Debug, Clone, Copy)]
pub struct AllContent<'a> {
    pub essays: &'a [Essay],
    pub field_notes: &'a [FieldNote],
    pub shelf: &'a [ShelfEntry],
}

/// Immutable corpus snapshot with a slug index.
///
/// Draft essays and field notes are filtered at construction; shelf
/// entries carry no draft flag and are always included.
#[derive(Debug, Default)]
pub struct ContentStore {
    essays: Vec<Essay>,
    field_notes: Vec<FieldNote>,
    shelf: Vec<ShelfEntry>,
    /// slug -> index into the owning collection, tagged by collection.
    index: FxHashMap<String, EntrySlot>,
}

#[derive(Debug, Clone, Copy)]
enum EntrySlot {
    Essay(usize),
    FieldNote(usize),
    Shelf(usize),
}

impl ContentStore {
    /// Assemble a store from parsed entries.
    ///
    /// # Errors
    ///
    /// Returns a contract violation for an empty or duplicate slug; both
    /// abort the build rather than silently misrouting connections.
    pub fn new(
        essays: Vec<Essay>,
        field_notes: Vec<FieldNote>,
        shelf: Vec<ShelfEntry>,
    ) -> Result<Self, CorpusError> {
        let mut store = Self {
            essays: essays.into_iter().filter(|e| !e.draft).collect(),
            field_notes: field_notes.into_iter().filter(|n| !n.draft).collect(),
            shelf,
            index: FxHashMap::default(),
        };

        let mut seen: FxHashMap<String, String> = FxHashMap::default();
        let mut check = |slug: &str, origin: String| -> Result<(), CorpusError> {
            if slug.trim().is_empty() {
                return Err(CorpusError::EmptySlug(origin.into()));
            }
            if let Some(first) = seen.insert(slug.to_owned(), origin.clone()) {
                return Err(CorpusError::DuplicateSlug(slug.to_owned(), first, origin));
            }
            Ok(())
        };

        for (i, essay) in store.essays.iter().enumerate() {
            check(&essay.slug, format!("essay `{}`", essay.title))?;
            store.index.insert(essay.slug.clone(), EntrySlot::Essay(i));
        }
        for (i, note) in store.field_notes.iter().enumerate() {
            check(&note.slug, format!("field note `{}`", note.title))?;
            store
                .index
                .insert(note.slug.clone(), EntrySlot::FieldNote(i));
        }
        for (i, entry) in store.shelf.iter().enumerate() {
            check(&entry.slug, format!("shelf entry `{}`", entry.title))?;
            store.index.insert(entry.slug.clone(), EntrySlot::Shelf(i));
        }

        Ok(store)
    }

    /// The engine-facing view of the whole corpus.
    pub fn all(&self) -> AllContent<'_> {
        AllContent {
            essays: &self.essays,
            field_notes: &self.field_notes,
            shelf: &self.shelf,
        }
    }

    /// Look up any entry by slug.
    pub fn get(&self, slug: &str) -> Option<ContentEntry> {
        match *self.index.get(slug)? {
            EntrySlot::Essay(i) => Some(ContentEntry::Essay(self.essays[i].clone())),
            EntrySlot::FieldNote(i) => Some(ContentEntry::FieldNote(self.field_notes[i].clone())),
            EntrySlot::Shelf(i) => Some(ContentEntry::Shelf(self.shelf[i].clone())),
        }
    }

    /// Look up an essay by slug.
    pub fn essay(&self, slug: &str) -> Option<&Essay> {
        match *self.index.get(slug)? {
            EntrySlot::Essay(i) => Some(&self.essays[i]),
            _ => None,
        }
    }

    pub fn essays(&self) -> &[Essay] {
        &self.essays
    }

    pub fn field_notes(&self) -> &[FieldNote] {
        &self.field_notes
    }

    pub fn shelf(&self) -> &[ShelfEntry] {
        &self.shelf
    }

    pub fn is_empty(&self) -> bool {
        self.essays.is_empty() && self.field_notes.is_empty() && self.shelf.is_empty()
    }

    /// Total entry count across collections.
    pub fn len(&self) -> usize {
        self.essays.len() + self.field_notes.len() + self.shelf.len()
    }
}

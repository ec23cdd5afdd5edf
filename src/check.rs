//! Corpus reference audit for the `check` command.
//!
//! The engine drops unresolved references silently at build time (the
//! page still renders); `check` surfaces them so the author can fix the
//! front matter. Exits non-zero when anything dangles.

use anyhow::{Result, bail};

use crate::config::SiteConfig;
use crate::corpus::{Backlink, ContentEntry, ContentStore, load_corpus};
use crate::log;

/// A dangling reference found in the corpus.
#[derive(Debug, PartialEq, Eq)]
pub struct DanglingRef {
    /// Slug of the entry holding the reference.
    pub from: String,
    /// Front-matter field the reference sits in.
    pub field: &'static str,
    /// The slug that did not resolve.
    pub target: String,
}

/// Load the corpus and fail if any declared reference does not resolve.
pub fn check_corpus(config: &SiteConfig) -> Result<()> {
    let store = load_corpus(&config.site.content)?;
    log!("corpus"; "loaded {} entries", store.len());

    let dangling = find_dangling_refs(&store);
    if dangling.is_empty() {
        log!("check"; "all references resolve");
        return Ok(());
    }

    for d in &dangling {
        log!("check"; "`{}`: {} -> `{}` does not resolve", d.from, d.field, d.target);
    }
    bail!("{} unresolved reference(s)", dangling.len());
}

/// Collect every declared reference that does not resolve. `related`
/// must target an essay or a field note; the back-link fields must
/// target an essay.
pub fn find_dangling_refs(store: &ContentStore) -> Vec<DanglingRef> {
    let mut dangling = Vec::new();

    for essay in store.essays() {
        for slug in &essay.related {
            let resolves = matches!(
                store.get(slug),
                Some(ContentEntry::Essay(_) | ContentEntry::FieldNote(_))
            );
            if !resolves {
                dangling.push(DanglingRef {
                    from: essay.slug.clone(),
                    field: "related",
                    target: slug.clone(),
                });
            }
        }
    }
    for note in store.field_notes() {
        if let Backlink::Explicit(slug) = &note.connected_to {
            if store.essay(slug).is_none() {
                dangling.push(DanglingRef {
                    from: note.slug.clone(),
                    field: "connectedTo",
                    target: slug.clone(),
                });
            }
        }
    }
    for entry in store.shelf() {
        if let Backlink::Explicit(slug) = &entry.connected_essay {
            if store.essay(slug).is_none() {
                dangling.push(DanglingRef {
                    from: entry.slug.clone(),
                    field: "connectedEssay",
                    target: slug.clone(),
                });
            }
        }
    }

    dangling
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Essay, FieldNote, ShelfEntry};

    #[test]
    fn test_clean_corpus_has_no_dangling_refs() {
        let store = ContentStore::new(
            vec![
                Essay {
                    slug: "a".into(),
                    title: "A".into(),
                    related: vec!["n".into()],
                    ..Default::default()
                },
                Essay {
                    slug: "b".into(),
                    title: "B".into(),
                    ..Default::default()
                },
            ],
            vec![FieldNote {
                slug: "n".into(),
                title: "N".into(),
                connected_to: Backlink::Explicit("a".into()),
                ..Default::default()
            }],
            vec![],
        )
        .unwrap();

        assert!(find_dangling_refs(&store).is_empty());
    }

    #[test]
    fn test_related_to_shelf_entry_reported() {
        let store = ContentStore::new(
            vec![Essay {
                slug: "a".into(),
                title: "A".into(),
                related: vec!["s".into()],
                ..Default::default()
            }],
            vec![],
            vec![ShelfEntry {
                slug: "s".into(),
                title: "S".into(),
                ..Default::default()
            }],
        )
        .unwrap();

        let dangling = find_dangling_refs(&store);
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].field, "related");
        assert_eq!(dangling[0].target, "s");
    }

    #[test]
    fn test_dangling_related_and_backlinks_reported() {
        let store = ContentStore::new(
            vec![Essay {
                slug: "a".into(),
                title: "A".into(),
                related: vec!["ghost".into()],
                ..Default::default()
            }],
            vec![FieldNote {
                slug: "n".into(),
                title: "N".into(),
                connected_to: Backlink::Explicit("gone".into()),
                ..Default::default()
            }],
            vec![ShelfEntry {
                slug: "s".into(),
                title: "S".into(),
                connected_essay: Backlink::Explicit("n".into()), // resolves, but not to an essay
                ..Default::default()
            }],
        )
        .unwrap();

        let dangling = find_dangling_refs(&store);
        assert_eq!(dangling.len(), 3);
        assert!(dangling.iter().any(|d| d.field == "related" && d.target == "ghost"));
        assert!(dangling.iter().any(|d| d.field == "connectedTo" && d.target == "gone"));
        assert!(dangling.iter().any(|d| d.field == "connectedEssay" && d.target == "n"));
    }
}

//! Connection scoring and ranking.
//!
//! For one essay against the full corpus, the scorer emits a ranked,
//! deduplicated list of [`Connection`]s in three passes plus a fallback:
//!
//! 1. Explicit `related` links, in the author's declared order
//! 2. Explicit backlinks (`connectedTo` on notes, `connectedEssay` on shelf)
//! 3. URL-matched sources (shelf url == a cited source url)
//! 4. Tag overlap with field notes, only when passes 1-3 produced fewer
//!    than the configured minimum
//!
//! Ranking is a single named comparator: kind rank, then weight, then
//! date (newest first, dated before undated), then slug. The final list
//! is truncated to the configured cap.

use anyhow::{Result, bail};
use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::corpus::{AllContent, EntryKind, Essay, FieldNote, ShelfEntry};
use crate::log;

/// How a connection was derived.
///
/// Explicit kinds always outrank inferred kinds for the same target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionKind {
    /// Listed in the essay's `related` front matter.
    ExplicitRelated,
    /// Another entry declares `connectedTo`/`connectedEssay` at this essay.
    ExplicitBacklink,
    /// A shelf entry's URL matches one of the essay's cited sources.
    SourceMatch,
    /// Inferred from shared tags (fallback only).
    TagOverlap,
}

impl ConnectionKind {
    /// Rank partition: both explicit kinds sit above source matches,
    /// which sit above tag inference.
    pub const fn rank(self) -> u8 {
        match self {
            Self::ExplicitRelated | Self::ExplicitBacklink => 3,
            Self::SourceMatch => 2,
            Self::TagOverlap => 1,
        }
    }

    /// True for the kinds counted against `min_primary_connections`.
    pub const fn is_primary(self) -> bool {
        !matches!(self, Self::TagOverlap)
    }
}

/// A scored relationship between an essay and another content entry.
#[derive(Debug, Clone, Serialize)]
pub struct Connection {
    /// Owning essay.
    pub source_slug: String,
    pub target_slug: String,
    pub target_type: EntryKind,
    pub kind: ConnectionKind,
    /// Relative strength within a kind; only compared between
    /// connections of the same rank.
    pub weight: u32,
    /// Target's publication date, a ranking tie-break.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_date"
    )]
    pub target_date: Option<NaiveDate>,
    /// Strings the target may be mentioned by in the essay body, title
    /// first. The positioner tries them in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mention_texts: Vec<String>,
}

/// Serialize a date as `YYYY-MM-DD`.
fn serialize_date<S: serde::Serializer>(
    date: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
        None => serializer.serialize_none(),
    }
}

/// Ranking order for connection lists.
///
/// Kind rank descending, weight descending, date descending (dated
/// entries before undated), slug ascending. The trailing slug key makes
/// the order total, so identical inputs always produce identical output.
pub fn compare_connections(a: &Connection, b: &Connection) -> std::cmp::Ordering {
    b.kind
        .rank()
        .cmp(&a.kind.rank())
        .then_with(|| b.weight.cmp(&a.weight))
        .then_with(|| compare_by_date(a.target_date, b.target_date))
        .then_with(|| a.target_slug.cmp(&b.target_slug))
}

/// Compare two optional dates for sorting (newest first).
///
/// Entries with dates come before entries without dates.
fn compare_by_date(a: Option<NaiveDate>, b: Option<NaiveDate>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Compute the ranked connection list for one essay.
///
/// Data sparsity (no related links, no matches, no shared tags) yields an
/// empty list, which is a valid result. An unresolvable `related` slug is
/// logged and dropped.
///
/// # Errors
///
/// Only for contract violations: an essay without a slug aborts the build.
pub fn compute_connections(
    essay: &Essay,
    all: AllContent<'_>,
    config: &EngineConfig,
) -> Result<Vec<Connection>> {
    if essay.slug.trim().is_empty() {
        bail!("essay `{}` has an empty slug", essay.title);
    }

    let mut scorer = Scorer::new(essay);

    // Pass 1: explicit `related` links, declared order encoded into the
    // weight so it survives the generic tie-break. `related` may target
    // essays and field notes only; shelf entries connect through their
    // URL or `connectedEssay` instead.
    let lookup = TargetIndex::build(all);
    for (pos, slug) in essay.related.iter().enumerate() {
        let Some(target) = lookup.get(slug) else {
            log!("engine"; "`{}`: unresolved related slug `{}` (dropped)", essay.slug, slug);
            continue;
        };
        if target.kind == EntryKind::Shelf {
            log!("engine"; "`{}`: related slug `{}` is a shelf entry (dropped)", essay.slug, slug);
            continue;
        }
        #[allow(clippy::cast_possible_truncation)] // related lists are tiny
        let weight = config.explicit_weight.saturating_sub(pos as u32);
        scorer.push(target, ConnectionKind::ExplicitRelated, weight);
    }

    // Pass 2: declared backlinks.
    for note in all.field_notes {
        if note.connected_to.points_to(&essay.slug) {
            scorer.push(
                Target::from_note(note),
                ConnectionKind::ExplicitBacklink,
                config.explicit_weight,
            );
        }
    }
    for entry in all.shelf {
        if entry.connected_essay.points_to(&essay.slug) {
            scorer.push(
                Target::from_shelf(entry),
                ConnectionKind::ExplicitBacklink,
                config.explicit_weight,
            );
        }
    }

    // Pass 3: URL-matched sources. Earlier citations are more central to
    // the essay and score higher.
    for entry in all.shelf {
        let Some(url) = entry.url.as_deref() else {
            continue;
        };
        if let Some(pos) = essay.sources.iter().position(|s| s.url == url) {
            #[allow(clippy::cast_possible_truncation)]
            let weight = config.source_weight.saturating_sub(pos as u32);
            scorer.push(Target::from_shelf(entry), ConnectionKind::SourceMatch, weight);
        }
    }

    // Fallback: tag overlap with field notes, only when the explicit and
    // source passes came up short.
    if scorer.primary_count() < config.min_primary_connections {
        let essay_tags: FxHashSet<&str> = essay.tags.iter().map(String::as_str).collect();
        for note in all.field_notes {
            let shared = note
                .tags
                .iter()
                .filter(|t| essay_tags.contains(t.as_str()))
                .count();
            if shared > 0 {
                #[allow(clippy::cast_possible_truncation)]
                scorer.push(Target::from_note(note), ConnectionKind::TagOverlap, shared as u32);
            }
        }
    }

    let mut connections = scorer.into_connections();
    connections.sort_by(compare_connections);
    connections.truncate(config.max_connections);
    Ok(connections)
}

// ============================================================================
// Scoring internals
// ============================================================================

/// Borrowed view of a potential connection target.
#[derive(Debug, Clone, Copy)]
struct Target<'a> {
    slug: &'a str,
    title: &'a str,
    aliases: &'a [String],
    date: Option<NaiveDate>,
    kind: EntryKind,
}

impl<'a> Target<'a> {
    fn from_essay(essay: &'a Essay) -> Self {
        Self {
            slug: &essay.slug,
            title: &essay.title,
            aliases: &essay.aliases,
            date: essay.date,
            kind: EntryKind::Essay,
        }
    }

    fn from_note(note: &'a FieldNote) -> Self {
        Self {
            slug: &note.slug,
            title: &note.title,
            aliases: &note.aliases,
            date: note.date,
            kind: EntryKind::FieldNote,
        }
    }

    fn from_shelf(entry: &'a ShelfEntry) -> Self {
        Self {
            slug: &entry.slug,
            title: &entry.title,
            aliases: &entry.aliases,
            date: entry.date,
            kind: EntryKind::Shelf,
        }
    }

    fn mention_texts(&self) -> Vec<String> {
        std::iter::once(self.title.to_owned())
            .chain(self.aliases.iter().cloned())
            .collect()
    }
}

/// Slug lookup over the whole corpus for resolving `related` lists.
struct TargetIndex<'a> {
    by_slug: FxHashMap<&'a str, Target<'a>>,
}

impl<'a> TargetIndex<'a> {
    fn build(all: AllContent<'a>) -> Self {
        let mut by_slug = FxHashMap::default();
        for essay in all.essays {
            by_slug.insert(essay.slug.as_str(), Target::from_essay(essay));
        }
        for note in all.field_notes {
            by_slug.insert(note.slug.as_str(), Target::from_note(note));
        }
        for entry in all.shelf {
            by_slug.insert(entry.slug.as_str(), Target::from_shelf(entry));
        }
        Self { by_slug }
    }

    fn get(&self, slug: &str) -> Option<Target<'a>> {
        self.by_slug.get(slug).copied()
    }
}

/// Accumulates candidates, deduplicating by target slug.
///
/// For a target seen twice, the higher-kind (then heavier) connection
/// wins, so an explicitly-related note never shows up again as a mere
/// tag overlap.
struct Scorer<'a> {
    source_slug: &'a str,
    best: FxHashMap<String, Connection>,
}

impl<'a> Scorer<'a> {
    fn new(essay: &'a Essay) -> Self {
        Self {
            source_slug: &essay.slug,
            best: FxHashMap::default(),
        }
    }

    fn push(&mut self, target: Target<'_>, kind: ConnectionKind, weight: u32) {
        // Never a self-loop
        if target.slug == self.source_slug {
            return;
        }

        let candidate = Connection {
            source_slug: self.source_slug.to_owned(),
            target_slug: target.slug.to_owned(),
            target_type: target.kind,
            kind,
            weight,
            target_date: target.date,
            mention_texts: target.mention_texts(),
        };

        match self.best.get(target.slug) {
            Some(existing)
                if (existing.kind.rank(), existing.weight) >= (kind.rank(), weight) => {}
            _ => {
                self.best.insert(target.slug.to_owned(), candidate);
            }
        }
    }

    fn primary_count(&self) -> usize {
        self.best.values().filter(|c| c.kind.is_primary()).count()
    }

    fn into_connections(self) -> Vec<Connection> {
        self.best.into_values().collect()
    }
}

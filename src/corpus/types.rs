//! Content entry types for the corpus.
//!
//! Every entry is a markdown file with YAML front matter. The types here
//! mirror the front-matter schema of the three content collections:
//! essays, field notes, and shelf/reference entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An explicit back-reference from one entry to an essay.
///
/// Modeled as a sum type rather than a nullable string so the explicit-link
/// branch of the scorer is exhaustive and compiler-checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Backlink {
    /// No back-reference declared.
    #[default]
    None,
    /// Declared back-reference to the essay with this slug.
    Explicit(String),
}

impl Backlink {
    /// True if this back-link explicitly targets `slug`.
    pub fn points_to(&self, slug: &str) -> bool {
        matches!(self, Self::Explicit(s) if s == slug)
    }
}

impl<'de> Deserialize<'de> for Backlink {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Front matter writes `connected_to: some-essay` or omits the key.
        // An empty string is treated the same as an omitted key.
        let value: Option<String> = Option::deserialize(deserializer)?;
        Ok(match value {
            Some(s) if !s.trim().is_empty() => Self::Explicit(s),
            _ => Self::None,
        })
    }
}

/// A cited source in an essay's front matter.
///
/// The list order is meaningful: earlier sources are more central to the
/// essay and score higher when matched against shelf entries.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Source {
    pub title: String,
    pub url: String,
}

/// Front matter of a long-form essay.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Essay {
    /// Unique key, stable identity. Derived from the file stem when the
    /// front matter omits it.
    #[serde(default)]
    pub slug: String,

    pub title: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Publication date (`YYYY-MM-DD`), used as a ranking tie-break.
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub draft: bool,

    /// One-line thesis shown in listings.
    #[serde(default)]
    pub thesis: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    /// Cited sources, ordered by centrality to the argument.
    #[serde(default)]
    pub sources: Vec<Source>,

    /// Explicit ordered links to other entries. The declared order is a
    /// ranking key and must survive scoring.
    #[serde(default)]
    pub related: Vec<String>,

    /// Alternate strings this essay may be mentioned by in other bodies.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Rendered markdown body (not part of the front matter).
    #[serde(skip)]
    pub body: String,
}

/// Front matter of a field note.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldNote {
    #[serde(default)]
    pub slug: String,

    pub title: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub draft: bool,

    #[serde(default)]
    pub excerpt: Option<String>,

    /// Strong explicit back-link to a single essay.
    #[serde(default, rename = "connectedTo", alias = "connected_to")]
    pub connected_to: Backlink,

    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(skip)]
    pub body: String,
}

/// Front matter of a shelf/reference entry.
///
/// Shelf entries have no draft flag; every entry on the shelf is public.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShelfEntry {
    #[serde(default)]
    pub slug: String,

    pub title: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<NaiveDate>,

    /// Canonical URL of the referenced work, matched against essay sources.
    #[serde(default)]
    pub url: Option<String>,

    /// Explicit back-link to the essay this reference underpins.
    #[serde(default, rename = "connectedEssay", alias = "connected_essay")]
    pub connected_essay: Backlink,

    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(skip)]
    pub body: String,
}

/// Which collection a content entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Essay,
    FieldNote,
    Shelf,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Essay => write!(f, "essay"),
            Self::FieldNote => write!(f, "field-note"),
            Self::Shelf => write!(f, "shelf"),
        }
    }
}

/// Typed union over the three entry variants, for uniform lookup by slug.
#[derive(Debug, Clone)]
pub enum ContentEntry {
    Essay(Essay),
    FieldNote(FieldNote),
    Shelf(ShelfEntry),
}

impl ContentEntry {
    pub fn slug(&self) -> &str {
        match self {
            Self::Essay(e) => &e.slug,
            Self::FieldNote(n) => &n.slug,
            Self::Shelf(s) => &s.slug,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Essay(e) => &e.title,
            Self::FieldNote(n) => &n.title,
            Self::Shelf(s) => &s.title,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Essay(e) => e.date,
            Self::FieldNote(n) => n.date,
            Self::Shelf(s) => s.date,
        }
    }

    pub const fn kind(&self) -> EntryKind {
        match self {
            Self::Essay(_) => EntryKind::Essay,
            Self::FieldNote(_) => EntryKind::FieldNote,
            Self::Shelf(_) => EntryKind::Shelf,
        }
    }

    /// Strings this entry may be mentioned by: title first, then aliases
    /// in declared order.
    pub fn mention_candidates(&self) -> impl Iterator<Item = &str> {
        let (title, aliases) = match self {
            Self::Essay(e) => (e.title.as_str(), e.aliases.as_slice()),
            Self::FieldNote(n) => (n.title.as_str(), n.aliases.as_slice()),
            Self::Shelf(s) => (s.title.as_str(), s.aliases.as_slice()),
        };
        std::iter::once(title).chain(aliases.iter().map(String::as_str))
    }
}

/// Parse an optional `YYYY-MM-DD` front-matter date.
fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid date `{s}`: {e}"))),
        None => Ok(None),
    }
}
